/**
 * User Model and Database Operations
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::{Role, User};

/// Row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// `admin` or `worker`
    pub role: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown role '{}' for user {}, treating as worker", self.role, self.id);
            Role::Worker
        })
    }

    /// Public profile, without the password hash
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role(),
            created_at: Some(self.created_at),
            last_login_at: self.last_login_at,
        }
    }
}

const COLUMNS: &str = "id, email, name, role, password_hash, created_at, last_login_at";

pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    role: Role,
    password_hash: &str,
) -> Result<UserRecord, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        r#"
        INSERT INTO users (id, email, name, role, password_hash, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(role.as_str())
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_id(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY created_at, email"
    ))
    .fetch_all(pool)
    .await
}

pub async fn touch_last_login(pool: &SqlitePool, id: Uuid) -> Result<UserRecord, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2 RETURNING {COLUMNS}"
    ))
    .bind(Utc::now())
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Change name and/or role; `None` when the user does not exist
pub async fn update_user(
    pool: &SqlitePool,
    id: Uuid,
    name: Option<&str>,
    role: Option<Role>,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE(?1, name), role = COALESCE(?2, role)
        WHERE id = ?3
        RETURNING {COLUMNS}
        "#
    ))
    .bind(name)
    .bind(role.map(|r| r.as_str()))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Sessions and registrations go with the user
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
