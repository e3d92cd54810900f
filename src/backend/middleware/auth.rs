/**
 * Authentication Middleware
 *
 * Protects every route except register, login, refresh and health. A
 * request passes when:
 *
 * 1. the `Authorization` header has the form `Bearer <token>`
 * 2. the JWT signature and expiry check out
 * 3. the server session named by `sid` still exists (not logged out)
 * 4. the user still exists
 *
 * The user's current role is read from the database, so a role change by
 * an admin applies to tokens already issued.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::session_exists;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::Role;

/// Authenticated user data attached to the request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub session_id: Uuid,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            BackendError::unauthorized("Authentication required")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        BackendError::unauthorized("Invalid authorization header")
    })?;

    let claims = app_state.keys.verify_token(token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        BackendError::from(e)
    })?;

    let (user_id, session_id) = match (claims.user_id(), claims.session_id()) {
        (Ok(user_id), Ok(session_id)) => (user_id, session_id),
        _ => {
            tracing::warn!("Token with malformed subject or session id");
            return Err(BackendError::unauthorized("Invalid or expired token"));
        }
    };

    if !session_exists(&app_state.pool, session_id).await? {
        tracing::debug!("Session {} no longer exists", session_id);
        return Err(BackendError::unauthorized("Session has ended"));
    }

    let user = get_user_by_id(&app_state.pool, user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for deleted user {}", user_id);
            BackendError::unauthorized("User no longer exists")
        })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: user.email.clone(),
        role: user.role(),
        session_id,
    });

    Ok(next.run(request).await)
}

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, BackendError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("AuthenticatedUser not found in request extensions");
            BackendError::unauthorized("Authentication required")
        })
}

/// Extractor for any authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticated(parts).map(AuthUser)
    }
}

/// Extractor that additionally requires the admin role (403 otherwise)
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        if !user.is_admin() {
            tracing::warn!("Admin route denied for {}", user.email);
            return Err(BackendError::forbidden("Admin access required"));
        }
        Ok(AdminUser(user))
    }
}
