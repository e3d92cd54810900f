/**
 * Refresh Handler
 *
 * POST /api/auth/refresh with `{ "refresh_token": ... }`. Exchanges a
 * valid refresh token for a new access token and a new refresh token; the
 * presented one stops working.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::auth_response;
use crate::backend::auth::sessions::{delete_session, find_by_refresh_token, rotate_refresh_token};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::{AuthResponse, RefreshRequest};

const INVALID_REFRESH: &str = "Invalid or expired refresh token";

pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> BackendResult<Json<AuthResponse>> {
    let session = find_by_refresh_token(&state.pool, &request.refresh_token)
        .await?
        .ok_or_else(|| BackendError::unauthorized(INVALID_REFRESH))?;

    if session.is_expired() {
        tracing::info!("Refresh token for session {} expired", session.id);
        delete_session(&state.pool, session.id).await?;
        return Err(BackendError::unauthorized(INVALID_REFRESH));
    }

    let user = get_user_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized(INVALID_REFRESH))?;

    let session = rotate_refresh_token(
        &state.pool,
        session.id,
        &request.refresh_token,
        state.config.refresh_token_ttl,
    )
    .await?
    .ok_or_else(|| {
        tracing::warn!("Refresh token for session {} was already used", session.id);
        BackendError::unauthorized(INVALID_REFRESH)
    })?;

    tracing::debug!("Session {} refreshed", session.id);
    Ok(Json(auth_response(&state, &user, &session)?))
}
