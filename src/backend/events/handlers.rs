/**
 * Event HTTP Handlers
 *
 * ## Any authenticated user
 * - `GET /api/events`
 * - `GET /api/events/{id}`
 * - `POST /api/events/{id}/register`
 * - `DELETE /api/events/{id}/register`
 *
 * ## Admin only (403 otherwise)
 * - `POST /api/events`
 * - `PUT /api/events/{id}`
 * - `DELETE /api/events/{id}`
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::db::{self, RegisterOutcome, UpdateOutcome};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::{AdminUser, AuthUser};
use crate::backend::server::state::AppState;
use crate::shared::{Event, EventDraft, EventUpdate, MessageResponse};

const EVENT_NOT_FOUND: &str = "Event not found";

async fn load_event(state: &AppState, id: Uuid) -> BackendResult<Event> {
    db::get_event(&state.pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found(EVENT_NOT_FOUND))
}

pub async fn list_events(State(state): State<AppState>) -> BackendResult<Json<Vec<Event>>> {
    let events = db::list_events(&state.pool).await?;
    tracing::debug!("Listing {} events", events.len());
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<Event>> {
    Ok(Json(load_event(&state, id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<EventDraft>,
) -> BackendResult<(StatusCode, Json<Event>)> {
    draft.validate()?;

    let event = db::create_event(&state.pool, &draft, admin.user_id).await?;
    tracing::info!("Event {} created by {}", event.id, admin.email);

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(update): Json<EventUpdate>,
) -> BackendResult<Json<Event>> {
    update.validate()?;

    match db::update_event(&state.pool, id, &update).await? {
        UpdateOutcome::Updated(event) => {
            tracing::info!("Event {} updated by {}", id, admin.email);
            Ok(Json(event))
        }
        UpdateOutcome::NotFound => Err(BackendError::not_found(EVENT_NOT_FOUND)),
        UpdateOutcome::BelowRoster { registered } => Err(BackendError::bad_request(format!(
            "Required workers cannot be lower than the {} already registered",
            registered
        ))),
    }
}

pub async fn delete_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<MessageResponse>> {
    if !db::delete_event(&state.pool, id).await? {
        return Err(BackendError::not_found(EVENT_NOT_FOUND));
    }
    tracing::info!("Event {} deleted by {}", id, admin.email);
    Ok(Json(MessageResponse::new("Event deleted")))
}

pub async fn register_for_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<Event>> {
    match db::register_user(&state.pool, id, user.user_id).await? {
        RegisterOutcome::Registered => {
            tracing::info!("{} registered for event {}", user.email, id);
            Ok(Json(load_event(&state, id).await?))
        }
        RegisterOutcome::AlreadyRegistered => {
            Err(BackendError::conflict("Already registered for this event"))
        }
        RegisterOutcome::Full => Err(BackendError::conflict("Event is full")),
        RegisterOutcome::EventNotFound => Err(BackendError::not_found(EVENT_NOT_FOUND)),
    }
}

pub async fn unregister_from_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<Event>> {
    if !db::unregister_user(&state.pool, id, user.user_id).await? {
        // tell "no such event" apart from "not on the roster"
        load_event(&state, id).await?;
        return Err(BackendError::not_found("Not registered for this event"));
    }
    tracing::info!("{} unregistered from event {}", user.email, id);
    Ok(Json(load_event(&state, id).await?))
}
