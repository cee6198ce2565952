use std::sync::Arc;

use chirp_db::{Database, is_unique_violation};
use chirp_types::api::{LoginRequest, RegisterRequest};
use chirp_types::models::Account;
use tracing::{debug, error, warn};

use super::{MIN_PASSWORD_LEN, trim_blank};
use crate::error::{ServiceError, ServiceResult};

/// An account as submitted for registration, before any rule has run.
#[derive(Debug, Clone, Default)]
pub struct AccountDraft {
    pub account_id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterRequest> for AccountDraft {
    fn from(req: RegisterRequest) -> Self {
        Self {
            account_id: req.account_id,
            username: req.username,
            password: req.password,
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create_account(&self, draft: AccountDraft) -> ServiceResult<Account> {
        if draft.account_id.is_some_and(|id| id != 0) {
            return Err(ServiceError::Invalid("account_id is assigned by the server"));
        }

        let username = match draft.username {
            Some(u) if !trim_blank(&u).is_empty() => u,
            _ => return Err(ServiceError::Invalid("username must not be blank")),
        };

        let password = match draft.password {
            Some(p) if trim_blank(&p).chars().count() >= MIN_PASSWORD_LEN => p,
            _ => return Err(ServiceError::Invalid("password is too short")),
        };

        let existing = self.db.get_account_by_username(&username).map_err(|e| {
            error!("Username lookup failed for '{}': {:#}", username, e);
            ServiceError::Storage(e)
        })?;
        if existing.is_some() {
            warn!("Registration rejected, username '{}' is taken", username);
            return Err(ServiceError::Invalid("username is taken"));
        }

        let account = Account {
            account_id: 0,
            username,
            password,
        };

        // The UNIQUE constraint settles a race between two concurrent sign-ups.
        let saved = self.db.insert_account(&account).map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Registration lost race for username '{}'", account.username);
                ServiceError::Invalid("username is taken")
            } else {
                error!("Failed to insert account '{}': {:#}", account.username, e);
                ServiceError::Storage(e)
            }
        })?;

        debug!("Registered account {} ({})", saved.account_id, saved.username);
        Ok(saved)
    }

    pub fn login(&self, req: &LoginRequest) -> ServiceResult<Account> {
        let account = self
            .db
            .authenticate_account(&req.username, &req.password)
            .map_err(|e| {
                error!("Login lookup failed for '{}': {:#}", req.username, e);
                ServiceError::Storage(e)
            })?
            .ok_or(ServiceError::Unauthorized)?;

        debug!("Account {} logged in", account.account_id);
        Ok(account)
    }
}
