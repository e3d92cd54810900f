/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Record the login time
 * 4. Start a session and return its tokens with the profile
 *
 * Unknown email and wrong password both answer `401 Invalid credentials`.
 */

use axum::{extract::State, response::Json};
use bcrypt::verify;

use crate::backend::auth::handlers::{normalize_email, start_session};
use crate::backend::auth::users::{get_user_by_email, touch_last_login};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::{AuthResponse, LoginRequest};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> BackendResult<Json<AuthResponse>> {
    let email = normalize_email(&request.email);
    tracing::info!("Login request for: {}", email);

    let user = get_user_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", email);
            BackendError::unauthorized(INVALID_CREDENTIALS)
        })?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", email);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let user = touch_last_login(&state.pool, user.id).await?;
    let response = start_session(&state, &user).await?;

    tracing::info!("User logged in successfully: {}", user.email);
    Ok(Json(response))
}
