/**
 * Session Management and JWT Tokens
 *
 * A login creates a row in `sessions` holding an opaque refresh token. The
 * access token is a short-lived HS256 JWT whose `sid` claim names that row;
 * deleting the row (logout) invalidates both tokens at once.
 */

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::Role;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Server session ID
    pub sid: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }
}

/// Signing keys derived from `JWT_SECRET`
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
}

impl AuthKeys {
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
        }
    }

    /// Issue an access token; returns it with its expiry
    pub fn create_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        session_id: Uuid,
    ) -> Result<(String, DateTime<Utc>), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.access_ttl.as_secs() as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            sid: session_id.to_string(),
            iat: unix(now),
            exp: unix(expires_at),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok((token, expires_at))
    }

    /// Verify signature and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let token_data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(token_data.claims)
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys")
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

fn unix(at: DateTime<Utc>) -> u64 {
    at.timestamp().max(0) as u64
}

/// Row of the `sessions` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

fn new_refresh_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Start a session; expired sessions of every user are dropped first
pub async fn create_session(
    pool: &SqlitePool,
    user_id: Uuid,
    ttl: Duration,
) -> Result<Session, sqlx::Error> {
    let now = Utc::now();
    let pruned = delete_expired_sessions(pool, now).await?;
    if pruned > 0 {
        tracing::debug!("Pruned {} expired sessions", pruned);
    }

    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, refresh_token, expires_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, user_id, refresh_token, expires_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(new_refresh_token())
    .bind(now + chrono::Duration::seconds(ttl.as_secs() as i64))
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

pub async fn find_by_refresh_token(
    pool: &SqlitePool,
    refresh_token: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, refresh_token, expires_at, created_at
        FROM sessions
        WHERE refresh_token = ?1
        "#,
    )
    .bind(refresh_token)
    .fetch_optional(pool)
    .await
}

/// Swap the refresh token of a session
///
/// `None` when `previous` was already rotated by a concurrent call.
pub async fn rotate_refresh_token(
    pool: &SqlitePool,
    session_id: Uuid,
    previous: &str,
    ttl: Duration,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        UPDATE sessions
        SET refresh_token = ?1, expires_at = ?2
        WHERE id = ?3 AND refresh_token = ?4
        RETURNING id, user_id, refresh_token, expires_at, created_at
        "#,
    )
    .bind(new_refresh_token())
    .bind(Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64))
    .bind(session_id)
    .bind(previous)
    .fetch_optional(pool)
    .await
}

pub async fn session_exists(pool: &SqlitePool, session_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM sessions WHERE id = ?1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn delete_expired_sessions(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_session(pool: &SqlitePool, session_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::{load_database, ServerConfig};

    async fn pool() -> SqlitePool {
        let config = ServerConfig {
            database_url: "sqlite::memory:".to_string(),
            ..ServerConfig::default()
        };
        load_database(&config).await.unwrap()
    }

    async fn session_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    fn keys() -> AuthKeys {
        AuthKeys::new("test-secret", Duration::from_secs(60))
    }

    #[test]
    fn test_create_and_verify_token() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let (token, expires_at) = keys()
            .create_token(user_id, "test@example.com", Role::Admin, session_id)
            .unwrap();
        assert!(expires_at > Utc::now());

        let claims = keys().verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.session_id().unwrap(), session_id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_invalid_token() {
        assert!(keys().verify_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let (token, _) = AuthKeys::new("other-secret", Duration::from_secs(60))
            .create_token(Uuid::new_v4(), "a@example.com", Role::Worker, Uuid::new_v4())
            .unwrap();
        assert!(keys().verify_token(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@example.com".to_string(),
            role: Role::Worker,
            sid: Uuid::new_v4().to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(keys().verify_token(&token).is_err());
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        assert_ne!(new_refresh_token(), new_refresh_token());
        assert_eq!(new_refresh_token().len(), 64);
    }

    #[tokio::test]
    async fn test_abandoned_sessions_are_pruned_on_login() {
        let pool = pool().await;
        let user = create_user(&pool, "a@example.com", "A", Role::Worker, "hash")
            .await
            .unwrap();

        for _ in 0..5 {
            create_session(&pool, user.id, Duration::ZERO).await.unwrap();
        }

        // only the newest one, expired but not yet pruned, is left
        assert_eq!(session_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_pruning_keeps_live_sessions() {
        let pool = pool().await;
        let user = create_user(&pool, "a@example.com", "A", Role::Worker, "hash")
            .await
            .unwrap();

        let live = create_session(&pool, user.id, Duration::from_secs(60))
            .await
            .unwrap();
        create_session(&pool, user.id, Duration::ZERO).await.unwrap();
        create_session(&pool, user.id, Duration::ZERO).await.unwrap();

        assert_eq!(session_count(&pool).await, 2);
        assert!(session_exists(&pool, live.id).await.unwrap());
        let found = find_by_refresh_token(&pool, &live.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert!(!found.is_expired());
    }
}
