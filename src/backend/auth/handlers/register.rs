/**
 * Registration Handler
 *
 * POST /api/auth/register. Creates the account and its profile, then
 * starts a session so the client is signed in right away.
 *
 * # Errors
 *
 * * `400` - invalid email, password shorter than 8 characters, empty name
 * * `403` - admin role requested while `ALLOW_ADMIN_SIGNUP` is off
 * * `409` - email already registered
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::{normalize_email, start_session};
use crate::backend::auth::users::{create_user, get_user_by_email, is_unique_violation};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::{AuthResponse, RegisterRequest, Role};

const EMAIL_TAKEN: &str = "Email is already registered";

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> BackendResult<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;

    let email = normalize_email(&request.email);
    tracing::info!("Registration request for: {}", email);

    if request.role == Role::Admin && !state.config.allow_admin_signup {
        tracing::warn!("Admin self-registration refused for {}", email);
        return Err(BackendError::forbidden("Admin accounts cannot be self-registered"));
    }

    if get_user_by_email(&state.pool, &email).await?.is_some() {
        return Err(BackendError::conflict(EMAIL_TAKEN));
    }

    let password_hash = bcrypt::hash(&request.password, state.config.bcrypt_cost)?;

    let user = create_user(
        &state.pool,
        &email,
        request.name.trim(),
        request.role,
        &password_hash,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            BackendError::conflict(EMAIL_TAKEN)
        } else {
            e.into()
        }
    })?;

    let response = start_session(&state, &user).await?;
    tracing::info!("User registered: {} ({})", user.email, user.role);

    Ok((StatusCode::CREATED, Json(response)))
}
