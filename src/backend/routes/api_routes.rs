/**
 * API Routes
 *
 * ## Public
 * - `POST /api/auth/register`
 * - `POST /api/auth/login`
 * - `POST /api/auth/refresh`
 *
 * ## Behind `auth_middleware`
 * - `POST /api/auth/logout`, `GET /api/auth/me`
 * - `/api/events` CRUD and `/api/events/{id}/register`
 * - `/api/users` (admin)
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{get_me, login, logout, refresh, register};
use crate::backend::events;
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;
use crate::backend::users;

pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

pub fn configure_protected_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me))
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/api/events/{id}/register",
            post(events::register_for_event).delete(events::unregister_from_event),
        )
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
}
