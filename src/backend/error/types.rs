/**
 * Backend Error Types
 *
 * Every handler returns `Result<_, BackendError>`. Business failures carry
 * their own status and a message meant for the user; infrastructure
 * failures (database, hashing) are logged and reported as a generic 500 so
 * internals never reach the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

const INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum BackendError {
    /// Request-level failure with an explicit status
    #[error("Handler error: {message}")]
    HandlerError { status: StatusCode, message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Malformed, forged or expired access token
    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    HashError(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::CONFLICT, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::DatabaseError(_) | Self::HashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TokenError(_) => StatusCode::UNAUTHORIZED,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::TokenError(_) => "Invalid or expired token".to_string(),
            Self::SharedError(err @ SharedError::ValidationError { .. }) => err.to_string(),
            Self::DatabaseError(_)
            | Self::HashError(_)
            | Self::SharedError(_)
            | Self::SerializationError(_) => INTERNAL.to_string(),
        }
    }
}
