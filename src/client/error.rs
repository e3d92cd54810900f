//! Gateway error types
//!
//! Every failure of a backend call ends up as one of these. Views show
//! [`GatewayError::user_message`]: the server's own text for business
//! errors, a generic line for transport and server faults.

use thiserror::Error;

const NETWORK_FAILURE: &str = "Unable to reach the server. Please try again.";
const SERVER_FAILURE: &str = "Something went wrong on the server. Please try again later.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection, timeout or protocol failure
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 that could not be recovered
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// 4xx other than 401
    #[error("request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// 5xx
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::Encode(_) | Self::InvalidUrl(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Text a view displays for this failure
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Unauthorized { message } if !message.is_empty() => message.clone(),
            Self::Unauthorized { .. } => SESSION_EXPIRED.to_string(),
            Self::Transport(_) => NETWORK_FAILURE.to_string(),
            Self::Server { .. } | Self::Decode(_) | Self::Encode(_) | Self::InvalidUrl(_) => {
                SERVER_FAILURE.to_string()
            }
        }
    }

    pub(crate) fn session_expired() -> Self {
        Self::Unauthorized {
            message: SESSION_EXPIRED.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_error_is_shown_verbatim() {
        let error = GatewayError::Api {
            status: 409,
            message: "Event is full".to_string(),
        };
        assert_eq!(error.user_message(), "Event is full");
        assert_eq!(error.status(), Some(409));
    }

    #[test]
    fn test_server_error_is_generic() {
        let error = GatewayError::Server {
            status: 500,
            message: "database is locked".to_string(),
        };
        assert_eq!(error.user_message(), SERVER_FAILURE);
    }

    #[test]
    fn test_unauthorized_message() {
        let error = GatewayError::Unauthorized {
            message: "Invalid credentials".to_string(),
        };
        assert!(error.is_unauthorized());
        assert_eq!(error.user_message(), "Invalid credentials");
        assert_eq!(GatewayError::session_expired().user_message(), SESSION_EXPIRED);
    }
}
