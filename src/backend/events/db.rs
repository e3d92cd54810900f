//! Event database operations
//!
//! Events live in `events`; the roster lives in `event_registrations`, one
//! row per (event, user), ordered by insertion. Capacity checks happen
//! inside the writing statement so two concurrent registrations cannot
//! overfill an event.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::shared::{Event, EventDraft, EventUpdate};

#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    date: DateTime<Utc>,
    location: Option<String>,
    required_workers: i64,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, registered_users: Vec<Uuid>) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            required_workers: u32::try_from(self.required_workers).unwrap_or(0),
            registered_users,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const COLUMNS: &str =
    "id, title, description, date, location, required_workers, created_by, created_at, updated_at";

/// Result of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    AlreadyRegistered,
    Full,
    EventNotFound,
}

/// Result of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Event),
    NotFound,
    /// New capacity is below the number of registered workers
    BelowRoster { registered: u32 },
}

fn non_empty(location: Option<&str>) -> Option<&str> {
    location.map(str::trim).filter(|l| !l.is_empty())
}

async fn roster<'e, E: SqliteExecutor<'e>>(
    executor: E,
    event_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT user_id FROM event_registrations WHERE event_id = ?1 ORDER BY rowid",
    )
    .bind(event_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(|(user_id,)| user_id).collect())
}

async fn event_exists(pool: &SqlitePool, event_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM events WHERE id = ?1")
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// All events, soonest first
pub async fn list_events(pool: &SqlitePool) -> Result<Vec<Event>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EventRow>(&format!("SELECT {COLUMNS} FROM events"))
        .fetch_all(pool)
        .await?;

    let registrations: Vec<(Uuid, Uuid)> =
        sqlx::query_as("SELECT event_id, user_id FROM event_registrations ORDER BY rowid")
            .fetch_all(pool)
            .await?;

    let mut rosters: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (event_id, user_id) in registrations {
        rosters.entry(event_id).or_default().push(user_id);
    }

    let mut events: Vec<Event> = rows
        .into_iter()
        .map(|row| {
            let registered = rosters.remove(&row.id).unwrap_or_default();
            row.into_event(registered)
        })
        .collect();
    events.sort_by_key(|e| (e.date, e.created_at));
    Ok(events)
}

pub async fn get_event(pool: &SqlitePool, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    let row = sqlx::query_as::<_, EventRow>(&format!("SELECT {COLUMNS} FROM events WHERE id = ?1"))
        .bind(event_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let registered = roster(pool, event_id).await?;
            Ok(Some(row.into_event(registered)))
        }
        None => Ok(None),
    }
}

pub async fn create_event(
    pool: &SqlitePool,
    draft: &EventDraft,
    created_by: Uuid,
) -> Result<Event, sqlx::Error> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, EventRow>(&format!(
        r#"
        INSERT INTO events
            (id, title, description, date, location, required_workers,
             created_by, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(draft.title.trim())
    .bind(&draft.description)
    .bind(draft.date)
    .bind(non_empty(draft.location.as_deref()))
    .bind(i64::from(draft.required_workers))
    .bind(created_by)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row.into_event(Vec::new()))
}

/// Apply a partial update
///
/// An empty `location` clears it. The capacity check and the write are a
/// single statement.
pub async fn update_event(
    pool: &SqlitePool,
    event_id: Uuid,
    update: &EventUpdate,
) -> Result<UpdateOutcome, sqlx::Error> {
    let row = sqlx::query_as::<_, EventRow>(&format!(
        r#"
        UPDATE events
        SET title = COALESCE(?2, title),
            description = COALESCE(?3, description),
            date = COALESCE(?4, date),
            location = CASE WHEN ?5 IS NULL THEN location WHEN ?5 = '' THEN NULL ELSE ?5 END,
            required_workers = COALESCE(?6, required_workers),
            updated_at = ?7
        WHERE id = ?1
          AND COALESCE(?6, required_workers) >=
              (SELECT COUNT(*) FROM event_registrations WHERE event_id = ?1)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(event_id)
    .bind(update.title.as_deref().map(str::trim))
    .bind(update.description.as_deref())
    .bind(update.date)
    .bind(update.location.as_deref().map(str::trim))
    .bind(update.required_workers.map(i64::from))
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    if let Some(row) = row {
        let registered = roster(pool, event_id).await?;
        return Ok(UpdateOutcome::Updated(row.into_event(registered)));
    }

    if !event_exists(pool, event_id).await? {
        return Ok(UpdateOutcome::NotFound);
    }
    let registered = roster(pool, event_id).await?.len();
    Ok(UpdateOutcome::BelowRoster {
        registered: u32::try_from(registered).unwrap_or(u32::MAX),
    })
}

/// Registrations are removed with the event
pub async fn delete_event(pool: &SqlitePool, event_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add `user_id` to the roster if there is room
pub async fn register_user(
    pool: &SqlitePool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<RegisterOutcome, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO event_registrations (event_id, user_id, registered_at)
        SELECT ?1, ?2, ?3
        WHERE (SELECT COUNT(*) FROM event_registrations WHERE event_id = ?1)
            < (SELECT required_workers FROM events WHERE id = ?1)
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(RegisterOutcome::Registered);
    }

    if !event_exists(pool, event_id).await? {
        return Ok(RegisterOutcome::EventNotFound);
    }
    if roster(pool, event_id).await?.contains(&user_id) {
        return Ok(RegisterOutcome::AlreadyRegistered);
    }
    Ok(RegisterOutcome::Full)
}

/// Remove `user_id` from the roster; false when they were not on it
pub async fn unregister_user(
    pool: &SqlitePool,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM event_registrations WHERE event_id = ?1 AND user_id = ?2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
