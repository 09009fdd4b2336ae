//! Unified error handling
//!
//! Every handler error becomes a JSON body `{code, message}` with the
//! matching status.
//!
//! # Error codes
//!
//! | Code | Status | Meaning |
//! |------|--------|---------|
//! | E0002 | 400 | validation failed |
//! | E0003 | 404 | resource not found |
//! | E3001 | 401 | not signed in |
//! | E9001 | 500 | internal error |

use axum::{
    Json,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response body
///
/// ```json
/// { "code": "E0002", "message": "name must not be empty" }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    /// Anonymous caller (401)
    Unauthorized,

    #[error("Resource not found: {0}")]
    /// 404
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// 400
    Validation(String),

    #[error("Internal server error: {0}")]
    /// 500
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please login first"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error",
                )
            }
        };

        let body = Json(AppResponse {
            code: code.to_string(),
            message: message.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<FormRejection> for AppError {
    fn from(e: FormRejection) -> Self {
        AppError::Validation(format!("Malformed form: {}", e.body_text()))
    }
}

pub type AppResult<T> = Result<T, AppError>;
