use std::sync::Arc;

use chirp_db::Database;
use chirp_types::api::CreateMessageRequest;
use chirp_types::models::Message;
use tracing::{debug, error, warn};

use super::{MAX_MESSAGE_LEN, trim_blank};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default)]
pub struct MessageDraft {
    pub posted_by: i64,
    pub message_text: String,
    pub time_posted_epoch: i64,
}

impl From<CreateMessageRequest> for MessageDraft {
    fn from(req: CreateMessageRequest) -> Self {
        Self {
            posted_by: req.posted_by,
            message_text: req.message_text,
            time_posted_epoch: req.time_posted_epoch,
        }
    }
}

/// Non-empty once trimmed, and at most `MAX_MESSAGE_LEN` characters once trimmed.
fn validate_text(text: &str) -> ServiceResult<()> {
    let trimmed = trim_blank(text);
    if trimmed.is_empty() {
        return Err(ServiceError::Invalid("message_text must not be blank"));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LEN {
        return Err(ServiceError::Invalid("message_text is too long"));
    }
    Ok(())
}

fn storage(context: &str) -> impl FnOnce(anyhow::Error) -> ServiceError + '_ {
    move |e| {
        error!("{}: {:#}", context, e);
        ServiceError::Storage(e)
    }
}

#[derive(Clone)]
pub struct MessageService {
    db: Arc<Database>,
}

impl MessageService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create_message(&self, draft: MessageDraft) -> ServiceResult<Message> {
        let poster = self
            .db
            .get_account_by_id(draft.posted_by)
            .map_err(storage("Poster lookup failed"))?;
        if poster.is_none() {
            warn!("Message rejected, account {} does not exist", draft.posted_by);
            return Err(ServiceError::Invalid("posted_by does not reference an account"));
        }

        validate_text(&draft.message_text)?;

        let saved = self
            .db
            .insert_message(&Message {
                message_id: 0,
                posted_by: draft.posted_by,
                message_text: draft.message_text,
                time_posted_epoch: draft.time_posted_epoch,
            })
            .map_err(storage("Failed to insert message"))?;

        debug!("Account {} posted message {}", saved.posted_by, saved.message_id);
        Ok(saved)
    }

    pub fn get_all_messages(&self) -> ServiceResult<Vec<Message>> {
        self.db
            .get_all_messages()
            .map_err(storage("Failed to list messages"))
    }

    pub fn get_message_by_id(&self, message_id: i64) -> ServiceResult<Option<Message>> {
        self.db
            .get_message_by_id(message_id)
            .map_err(storage("Failed to fetch message"))
    }

    /// Unconditional: deleting an unknown id is not an error.
    pub fn delete_message(&self, message_id: i64) -> ServiceResult<()> {
        let removed = self
            .db
            .delete_message(message_id)
            .map_err(storage("Failed to delete message"))?;
        debug!("Deleted message {} ({} row(s))", message_id, removed);
        Ok(())
    }

    pub fn update_message_text(&self, message_id: i64, text: &str) -> ServiceResult<Message> {
        validate_text(text)?;

        let mut message = self
            .get_message_by_id(message_id)?
            .ok_or(ServiceError::NotFound)?;

        message.message_text = text.to_string();
        self.db
            .update_message_text(&message)
            .map_err(storage("Failed to update message"))?;

        debug!("Updated text of message {}", message_id);
        Ok(message)
    }

    pub fn get_user_messages(&self, posted_by: i64) -> ServiceResult<Vec<Message>> {
        self.db
            .get_messages_by_poster(posted_by)
            .map_err(storage("Failed to list messages by poster"))
    }
}
