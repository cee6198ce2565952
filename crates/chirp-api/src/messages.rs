use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use chirp_types::api::{CreateMessageRequest, UpdateMessageRequest};
use chirp_types::models::Message;

use crate::auth::AppState;
use crate::{blocking, decode_body};
use crate::error::ServiceError;

/// Integer path segment, or a 400 whose body names the offending value.
fn parse_id(raw: &str, label: &str) -> Result<i64, Response> {
    raw.parse::<i64>().map_err(|_| {
        warn!("Rejected non-numeric {} id '{}'", label, raw);
        (
            StatusCode::BAD_REQUEST,
            Json(format!("Invalid {} ID: {}", label, raw)),
        )
            .into_response()
    })
}

/// List routes have no failure status; a storage error reads as "no messages".
fn or_empty(res: Result<Vec<Message>, ServiceError>) -> Json<Vec<Message>> {
    Json(res.unwrap_or_default())
}

pub async fn create_message(
    State(state): State<AppState>,
    body: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<Json<Message>, StatusCode> {
    let req = decode_body(body, StatusCode::BAD_REQUEST)?;
    let message = blocking(move || state.messages.create_message(req.into()))
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    Ok(Json(message))
}

pub async fn get_all_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    or_empty(blocking(move || state.messages.get_all_messages()).await)
}

/// A missing message is still a 200, just with an empty body.
pub async fn get_message(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, Response> {
    let message_id = parse_id(&raw_id, "message")?;

    let found = blocking(move || state.messages.get_message_by_id(message_id))
        .await
        .unwrap_or(None);

    Ok(match found {
        Some(message) => Json(message).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

/// Fetch, then delete. The two steps are not atomic: two concurrent deletes
/// of the same id may both answer with the message body.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, Response> {
    let message_id = parse_id(&raw_id, "message")?;

    let deleted = blocking(move || {
        let Some(message) = state.messages.get_message_by_id(message_id)? else {
            return Ok(None);
        };
        state.messages.delete_message(message_id)?;
        Ok(Some(message))
    })
    .await
    .unwrap_or(None);

    Ok(match deleted {
        Some(message) => Json(message).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateMessageRequest>, JsonRejection>,
) -> Result<Json<Message>, Response> {
    let message_id = parse_id(&raw_id, "message")?;
    let req = decode_body(body, StatusCode::BAD_REQUEST).map_err(IntoResponse::into_response)?;

    let message = blocking(move || state.messages.update_message_text(message_id, &req.message_text))
        .await
        .map_err(|_| StatusCode::BAD_REQUEST.into_response())?;

    Ok(Json(message))
}

pub async fn get_user_messages(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Message>>, Response> {
    let posted_by = parse_id(&raw_id, "account")?;

    Ok(or_empty(
        blocking(move || state.messages.get_user_messages(posted_by)).await,
    ))
}
