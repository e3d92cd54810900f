/**
 * Event Data Structures
 *
 * This module defines the Event snapshot returned by the API, the bodies
 * used to create and update events, and the roster rule that decides what
 * the registration button offers to a given user.
 *
 * The client never patches a snapshot locally; after every mutation it
 * refetches the whole list.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// A schedulable activity with a worker-capacity requirement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Scheduled start (UTC)
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Number of workers the event needs
    pub required_workers: u32,
    /// Registered user ids, in registration order
    #[serde(default)]
    pub registered_users: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the registration control should offer for one user and one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    /// User is not on the roster; `enabled` is false once the event is full
    Register { enabled: bool },
    /// User is on the roster
    Unregister,
}

impl RegistrationAction {
    pub fn is_enabled(&self) -> bool {
        match self {
            RegistrationAction::Register { enabled } => *enabled,
            RegistrationAction::Unregister => true,
        }
    }
}

impl Event {
    /// Number of free worker slots
    pub fn open_slots(&self) -> u32 {
        self.required_workers
            .saturating_sub(self.registered_users.len() as u32)
    }

    pub fn is_full(&self) -> bool {
        self.registered_users.len() >= self.required_workers as usize
    }

    pub fn is_registered(&self, user_id: Uuid) -> bool {
        self.registered_users.contains(&user_id)
    }

    /// Decide the registration control for `user_id`
    pub fn registration_action(&self, user_id: Uuid) -> RegistrationAction {
        if self.is_registered(user_id) {
            RegistrationAction::Unregister
        } else {
            RegistrationAction::Register {
                enabled: !self.is_full(),
            }
        }
    }
}

/// Body of `POST /api/events`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub required_workers: u32,
}

impl EventDraft {
    /// Validate the draft before it is sent or stored
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.title.trim().is_empty() {
            return Err(SharedError::validation("title", "Title is required"));
        }
        if self.required_workers == 0 {
            return Err(SharedError::validation(
                "required_workers",
                "At least one worker is required",
            ));
        }
        Ok(())
    }
}

/// Body of `PUT /api/events/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_workers: Option<u32>,
}

impl EventUpdate {
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(SharedError::validation("title", "Title is required"));
            }
        }
        if self.required_workers == Some(0) {
            return Err(SharedError::validation(
                "required_workers",
                "At least one worker is required",
            ));
        }
        Ok(())
    }
}

impl From<EventDraft> for EventUpdate {
    fn from(draft: EventDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            date: Some(draft.date),
            location: draft.location,
            required_workers: Some(draft.required_workers),
        }
    }
}
