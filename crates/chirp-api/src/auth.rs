use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use chirp_db::Database;
use chirp_types::api::{LoginRequest, RegisterRequest};
use chirp_types::models::Account;

use crate::{blocking, decode_body};
use crate::service::{AccountService, MessageService};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: AccountService,
    pub messages: MessageService,
}

impl AppStateInner {
    /// Both services share the one database handle.
    pub fn new(db: Arc<Database>) -> AppState {
        Arc::new(Self {
            accounts: AccountService::new(db.clone()),
            messages: MessageService::new(db),
        })
    }
}

/// Every rejection, including a storage failure, answers 400 with no body.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<Account>, StatusCode> {
    let req = decode_body(body, StatusCode::BAD_REQUEST)?;
    let account = blocking(move || state.accounts.create_account(req.into()))
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    Ok(Json(account))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Account>, StatusCode> {
    let req = decode_body(body, StatusCode::UNAUTHORIZED)?;
    let account = blocking(move || state.accounts.login(&req))
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    Ok(Json(account))
}
