/**
 * API Request and Response Types
 *
 * Bodies exchanged with the `/api/auth` endpoints and the generic
 * message/error envelopes every endpoint uses. The server serializes them,
 * the client gateway deserializes them.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::user::{Role, User};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 8;

fn validate_email(email: &str) -> Result<(), SharedError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(SharedError::validation("email", "A valid email address is required")),
    }
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    /// Verified against the stored bcrypt hash
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(SharedError::validation("password", "Password is required"));
        }
        Ok(())
    }
}

/// Registration request
///
/// Creates the account and the backend-side profile in one call.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SharedError::validation(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(SharedError::validation("name", "Name is required"));
        }
        Ok(())
    }
}

/// Refresh request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Auth response
///
/// Returned by register, login and refresh. Contains the bearer token,
/// the token used to obtain the next one, and the user profile.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// Bearer access token
    pub token: String,
    /// Opaque refresh token (rotated on every refresh)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry of `token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

/// Plain acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Admin edit of a user; absent fields are left unchanged
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Error envelope returned with every non-2xx status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}
