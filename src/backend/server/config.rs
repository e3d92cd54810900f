/**
 * Server Configuration
 *
 * Loaded from the environment (after `dotenv`), with defaults suitable for
 * local development:
 *
 * | env                      | default                          |
 * |--------------------------|----------------------------------|
 * | `DATABASE_URL`           | `sqlite://eventboard.db?mode=rwc` |
 * | `JWT_SECRET`             | development secret (warns)       |
 * | `ACCESS_TOKEN_TTL_SECS`  | `900`                            |
 * | `REFRESH_TOKEN_TTL_SECS` | `2592000` (30 days)              |
 * | `BCRYPT_COST`            | `bcrypt::DEFAULT_COST`           |
 * | `SERVER_PORT`            | `5000`                           |
 * | `ALLOW_ADMIN_SIGNUP`     | `true`                           |
 */

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::shared::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://eventboard.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 5000;

const DEV_JWT_SECRET: &str = "eventboard-dev-secret-change-me";

#[derive(Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub port: u16,
    /// Whether `POST /api/auth/register` may create admins
    pub allow_admin_signup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            port: DEFAULT_PORT,
            allow_admin_signup: true,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("port", &self.port)
            .field("allow_admin_signup", &self.allow_admin_signup)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => config.jwt_secret = secret,
            _ => tracing::warn!("JWT_SECRET not set, using the development secret"),
        }
        if let Some(secs) = parse_env::<u64>("ACCESS_TOKEN_TTL_SECS")? {
            config.access_token_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("REFRESH_TOKEN_TTL_SECS")? {
            config.refresh_token_ttl = Duration::from_secs(secs);
        }
        if let Some(cost) = parse_env::<u32>("BCRYPT_COST")? {
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::InvalidValue {
                    key: "BCRYPT_COST",
                    value: cost.to_string(),
                });
            }
            config.bcrypt_cost = cost;
        }
        if let Some(port) = parse_env::<u16>("SERVER_PORT")? {
            config.port = port;
        }
        if let Some(allow) = parse_env::<bool>("ALLOW_ADMIN_SIGNUP")? {
            config.allow_admin_signup = allow;
        }

        Ok(config)
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn parse_env<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}

/// Connect to SQLite and run the migrations
pub async fn load_database(config: &ServerConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // every connection to `:memory:` is its own database, so keep exactly one alive
    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
