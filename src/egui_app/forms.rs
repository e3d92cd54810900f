//! Form models behind the views
//!
//! Each form keeps the raw text the user typed and converts it into the
//! request body the gateway sends, running the same validation the server
//! applies.

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::shared::{
    Event, EventDraft, EventUpdate, LoginRequest, RegisterRequest, Role, SharedError,
};

/// Format of the date field, interpreted as UTC
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(text: &str) -> Result<DateTime<Utc>, SharedError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| SharedError::validation("date", "Date must look like 2025-06-01 18:30"))
}

fn parse_workers(text: &str) -> Result<u32, SharedError> {
    text.trim().parse().map_err(|_| {
        SharedError::validation("required_workers", "Required workers must be a whole number")
    })
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Default, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_request(&self) -> Result<LoginRequest, SharedError> {
        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn clear_secrets(&mut self) {
        self.password.clear();
    }
}

#[derive(Debug, Default, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub admin: bool,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, SharedError> {
        if self.password != self.confirm_password {
            return Err(SharedError::validation("password", "Passwords do not match"));
        }
        let request = RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            name: self.name.trim().to_string(),
            role: if self.admin { Role::Admin } else { Role::Worker },
        };
        request.validate()?;
        Ok(request)
    }

    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
    }
}

/// Create/edit form; `editing` is the event being edited, if any
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub editing: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub required_workers: String,
}

impl EventForm {
    /// Empty form for a new event
    pub fn new_event() -> Self {
        Self {
            required_workers: "1".to_string(),
            ..Self::default()
        }
    }

    /// Form pre-populated from an existing event
    pub fn from_event(event: &Event) -> Self {
        Self {
            editing: Some(event.id),
            title: event.title.clone(),
            description: event.description.clone(),
            date: format_date(&event.date),
            location: event.location.clone().unwrap_or_default(),
            required_workers: event.required_workers.to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn to_draft(&self) -> Result<EventDraft, SharedError> {
        let draft = EventDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: parse_date(&self.date)?,
            location: optional(&self.location),
            required_workers: parse_workers(&self.required_workers)?,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Full update; an emptied location clears it on the server
    pub fn to_update(&self) -> Result<EventUpdate, SharedError> {
        let draft = self.to_draft()?;
        Ok(EventUpdate {
            title: Some(draft.title),
            description: Some(draft.description),
            date: Some(draft.date),
            location: Some(draft.location.unwrap_or_default()),
            required_workers: Some(draft.required_workers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Beach cleanup".to_string(),
            description: "Bring gloves".to_string(),
            date: Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
            location: Some("North pier".to_string()),
            required_workers: 3,
            registered_users: vec![],
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_event_form_is_empty() {
        let form = EventForm::new_event();
        assert!(!form.is_editing());
        assert!(form.title.is_empty());
        assert!(form.date.is_empty());
        assert_eq!(form.required_workers, "1");
    }

    #[test]
    fn test_edit_form_prepopulates() {
        let event = event();
        let form = EventForm::from_event(&event);
        assert_eq!(form.editing, Some(event.id));
        assert_eq!(form.title, "Beach cleanup");
        assert_eq!(form.date, "2025-06-01 09:30");
        assert_eq!(form.location, "North pier");
        assert_eq!(form.required_workers, "3");
    }

    #[test]
    fn test_edit_form_round_trips_to_update() {
        let event = event();
        let update = EventForm::from_event(&event).to_update().unwrap();
        assert_eq!(update.title.as_deref(), Some("Beach cleanup"));
        assert_eq!(update.date, Some(event.date));
        assert_eq!(update.required_workers, Some(3));
    }

    #[test]
    fn test_cleared_location_is_sent_empty() {
        let mut form = EventForm::from_event(&event());
        form.location = "  ".to_string();
        assert_eq!(form.to_update().unwrap().location.as_deref(), Some(""));
        assert_eq!(form.to_draft().unwrap().location, None);
    }

    #[test]
    fn test_event_form_validation() {
        let mut form = EventForm::from_event(&event());
        form.date = "tomorrow".to_string();
        assert_eq!(form.to_draft().unwrap_err().field(), Some("date"));

        let mut form = EventForm::from_event(&event());
        form.required_workers = "0".to_string();
        assert_eq!(form.to_draft().unwrap_err().field(), Some("required_workers"));

        let mut form = EventForm::from_event(&event());
        form.required_workers = "-2".to_string();
        assert_eq!(form.to_draft().unwrap_err().field(), Some("required_workers"));

        let mut form = EventForm::from_event(&event());
        form.title = String::new();
        assert_eq!(form.to_draft().unwrap_err().field(), Some("title"));
    }

    #[test]
    fn test_register_form() {
        let mut form = RegisterForm {
            name: "Ada".to_string(),
            email: " ada@example.com ".to_string(),
            password: "longenough".to_string(),
            confirm_password: "different".to_string(),
            admin: false,
        };
        assert_eq!(form.to_request().unwrap_err().field(), Some("password"));

        form.confirm_password = "longenough".to_string();
        let request = form.to_request().unwrap();
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.role, Role::Worker);

        form.clear_secrets();
        assert!(form.password.is_empty() && form.confirm_password.is_empty());
    }

    #[test]
    fn test_login_form_requires_password() {
        let form = LoginForm {
            email: "user@example.com".to_string(),
            password: String::new(),
        };
        assert_eq!(form.to_request().unwrap_err().field(), Some("password"));
    }
}
