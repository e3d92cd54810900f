/**
 * Application State Management
 *
 * `AppState` is cloned into every handler. It holds the SQLite pool, the
 * JWT keys and the loaded configuration; the `FromRef` implementations let
 * handlers extract just the part they need.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::auth::sessions::AuthKeys;
use crate::backend::server::config::ServerConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub pool: SqlitePool,
    pub keys: Arc<AuthKeys>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig) -> Self {
        let keys = AuthKeys::new(&config.jwt_secret, config.access_token_ttl);
        Self {
            pool,
            keys: Arc::new(keys),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
