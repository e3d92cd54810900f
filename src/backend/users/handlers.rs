use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::backend::auth::users;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AdminUser;
use crate::backend::server::state::AppState;
use crate::shared::{MessageResponse, SharedError, User, UserUpdate};

const USER_NOT_FOUND: &str = "User not found";

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> BackendResult<Json<Vec<User>>> {
    let records = users::list_users(&state.pool).await?;
    Ok(Json(records.iter().map(|r| r.to_user()).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<User>> {
    let record = users::get_user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found(USER_NOT_FOUND))?;
    Ok(Json(record.to_user()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UserUpdate>,
) -> BackendResult<Json<User>> {
    let name = update.name.as_deref().map(str::trim);
    if name == Some("") {
        return Err(SharedError::validation("name", "Name is required").into());
    }

    let record = users::update_user(&state.pool, id, name, update.role)
        .await?
        .ok_or_else(|| BackendError::not_found(USER_NOT_FOUND))?;

    tracing::info!("User {} updated by {}", record.email, admin.email);
    Ok(Json(record.to_user()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<MessageResponse>> {
    if id == admin.user_id {
        return Err(BackendError::bad_request("You cannot delete your own account"));
    }
    if !users::delete_user(&state.pool, id).await? {
        return Err(BackendError::not_found(USER_NOT_FOUND));
    }
    tracing::info!("User {} deleted by {}", id, admin.email);
    Ok(Json(MessageResponse::new("User deleted")))
}
