/**
 * Router Configuration
 *
 * 1. Health check
 * 2. Public auth routes
 * 3. Protected API routes
 * 4. JSON 404 fallback
 *
 * Every request is traced; CORS is permissive so a browser front end can
 * talk to the API during development.
 */

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::{configure_protected_routes, configure_public_routes};
use crate::backend::server::state::AppState;

pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(|| async { "ok" }));

    let router = configure_public_routes(router);
    let router = router.merge(configure_protected_routes(&app_state));

    router
        .fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "Not found") })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
