/**
 * User Data Structure
 *
 * The user profile as the API returns it. The client keeps one cached copy
 * of this in its session storage; the server builds it from its user rows
 * and never includes the password hash.
 */
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Role of a user
///
/// Older deployments called administrators `manager` and workers
/// `volunteer`; both spellings are still accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates, edits and deletes events
    #[serde(alias = "manager")]
    Admin,
    /// Registers for events
    #[default]
    #[serde(alias = "volunteer")]
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "manager" => Ok(Role::Admin),
            "worker" | "volunteer" => Ok(Role::Worker),
            other => Err(SharedError::validation("role", format!("Unknown role '{}'", other))),
        }
    }
}

/// User information (without sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// User's unique ID
    pub id: Uuid,
    /// User's email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Role of the user
    pub role: Role,
    /// When the account was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last successful login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_legacy_names() {
        let admin: Role = serde_json::from_str("\"manager\"").unwrap();
        let worker: Role = serde_json::from_str("\"volunteer\"").unwrap();
        assert_eq!(admin, Role::Admin);
        assert_eq!(worker, Role::Worker);
    }

    #[test]
    fn test_role_serializes_canonical_name() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"worker\"");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("worker".parse::<Role>().unwrap(), Role::Worker);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_without_timestamps() {
        let json = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "email": "user@example.com",
            "name": "User",
            "role": "worker"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.email, "user@example.com");
        assert!(!user.is_admin());
        assert!(user.created_at.is_none());
    }
}
