pub mod auth;
pub mod error;
pub mod messages;
pub mod routes;
pub mod service;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use tracing::{error, warn};

use crate::error::{ServiceError, ServiceResult};

/// Run a service call on the blocking pool; SQLite access must stay off the
/// async workers.
pub(crate) async fn blocking<F, T>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ServiceError::Storage(anyhow::anyhow!("blocking task failed: {}", e))
    })?
}

/// Unwrap a JSON body, answering an undecodable one with the route's own
/// failure status and no body instead of axum's 4xx text.
pub(crate) fn decode_body<T>(
    body: Result<Json<T>, JsonRejection>,
    failure: StatusCode,
) -> Result<T, StatusCode> {
    body.map(|Json(value)| value).map_err(|rejection| {
        warn!("Rejected request body ({}): {}", rejection.status(), rejection.body_text());
        failure
    })
}
