/**
 * Server Initialization
 *
 * 1. Connect to SQLite and run the migrations
 * 2. Derive the JWT keys from the configuration
 * 3. Build the router
 */

use axum::Router;

use crate::backend::error::BackendResult;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> BackendResult<Router<()>> {
    tracing::info!("Initializing eventboard backend server");

    let pool = load_database(&config).await?;
    let app_state = AppState::new(pool, config);
    let app = create_router(app_state);

    tracing::info!("Router configured");
    Ok(app)
}
