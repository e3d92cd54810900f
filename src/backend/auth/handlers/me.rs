/**
 * Get Current User Handler
 *
 * GET /api/auth/me. The middleware has already checked the token and the
 * session; this returns the stored profile.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::User;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(auth_user): AuthUser,
) -> BackendResult<Json<User>> {
    let user = get_user_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    Ok(Json(user.to_user()))
}
