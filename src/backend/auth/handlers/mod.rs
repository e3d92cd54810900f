//! Authentication Handlers Module
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`refresh`** - POST /api/auth/refresh (rotates the refresh token)
//! - **`logout`** - POST /api/auth/logout (ends the server session)
//! - **`me`** - GET /api/auth/me

pub mod register;

pub mod login;

pub mod refresh;

pub mod logout;

pub mod me;

pub use login::login;
pub use logout::logout;
pub use me::get_me;
pub use refresh::refresh;
pub use register::register;

use crate::backend::auth::sessions::{create_session, Session};
use crate::backend::auth::users::UserRecord;
use crate::backend::error::BackendResult;
use crate::backend::server::state::AppState;
use crate::shared::AuthResponse;

/// Start a new server session for `user` and build the response body
pub(crate) async fn start_session(
    state: &AppState,
    user: &UserRecord,
) -> BackendResult<AuthResponse> {
    let session = create_session(&state.pool, user.id, state.config.refresh_token_ttl).await?;
    auth_response(state, user, &session)
}

/// Access token for an existing session plus its current refresh token
pub(crate) fn auth_response(
    state: &AppState,
    user: &UserRecord,
    session: &Session,
) -> BackendResult<AuthResponse> {
    let (token, expires_at) =
        state
            .keys
            .create_token(user.id, &user.email, user.role(), session.id)?;

    Ok(AuthResponse {
        token,
        refresh_token: Some(session.refresh_token.clone()),
        expires_at: Some(expires_at),
        user: user.to_user(),
    })
}

/// Emails are compared case-insensitively
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
