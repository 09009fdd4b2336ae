use thiserror::Error;

/// Startup and runtime failures of the server itself
///
/// Request-level failures are [`AppError`](crate::AppError).
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
