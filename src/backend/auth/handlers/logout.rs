//! POST /api/auth/logout

use axum::{extract::State, response::Json};

use crate::backend::auth::sessions::delete_session;
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::MessageResponse;

/// Delete the caller's session; its access and refresh tokens stop working
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<MessageResponse>> {
    delete_session(&state.pool, user.session_id).await?;
    tracing::info!("User logged out: {}", user.email);
    Ok(Json(MessageResponse::new("Logged out")))
}
