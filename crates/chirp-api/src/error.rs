use thiserror::Error;

/// Outcome of a rejected service call. Handlers fold these into the status
/// code their route documents; nothing here is an HTTP concept.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Invalid(&'static str),

    #[error("not found")]
    NotFound,

    #[error("credentials did not match")]
    Unauthorized,

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
