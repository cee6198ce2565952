use serde::Deserialize;

// -- Accounts --

/// Body of `POST /register`. Every field is optional on the wire so that the
/// account rules, not the JSON extractor, decide what is acceptable.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /login`. Clients usually echo back a full account, so
/// `account_id` is tolerated and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Messages --

/// Body of `POST /messages`. A supplied `message_id` is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub posted_by: i64,
    #[serde(default)]
    pub message_text: String,
    #[serde(default)]
    pub time_posted_epoch: i64,
}

/// Body of `PATCH /messages/{message_id}`. Only the text is read; the rest of
/// a full message object may ride along.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMessageRequest {
    #[serde(default)]
    pub message_text: String,
}
