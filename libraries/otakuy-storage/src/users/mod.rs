//! User account queries
//!
//! Star level and the moderator flag live here; they are read fresh for every
//! request so changes take effect without a new login.

use crate::StorageError;
use chrono::{DateTime, Utc};
use otakuy_core::UserId;
use serde::Serialize;
use sqlx::SqlitePool;

type Result<T> = std::result::Result<T, StorageError>;

/// A stored account, without its password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub star: u32,
    pub is_moderator: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    star: i64,
    is_moderator: bool,
    created_at: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self> {
        let star = u32::try_from(row.star)
            .map_err(|_| StorageError::corrupt(format!("user {} star out of range", row.id)))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| StorageError::corrupt(format!("user {} created_at: {e}", row.id)))?
            .with_timezone(&Utc);

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            star,
            is_moderator: row.is_moderator,
            created_at,
        })
    }
}

/// Create a new user
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `username` - Unique login name
/// * `password_hash` - Hashed password (should already be hashed with bcrypt)
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    star: u32,
    is_moderator: bool,
) -> Result<UserRecord> {
    let id = UserId::generate();
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, star, is_moderator, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.as_str())
    .bind(username)
    .bind(password_hash)
    .bind(i64::from(star))
    .bind(is_moderator)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| StorageError::not_found("user", id.as_str()))
}

/// Get a user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, star, is_moderator, created_at FROM users WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(UserRecord::try_from).transpose()
}

/// Get a user by login name
pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, star, is_moderator, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.map(UserRecord::try_from).transpose()
}

/// Get user's password hash for authentication
pub async fn get_password_hash(pool: &SqlitePool, id: &UserId) -> Result<Option<String>> {
    let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(hash)
}

/// Get all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<UserRecord>> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, star, is_moderator, created_at FROM users ORDER BY username",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(UserRecord::try_from).collect()
}

/// Change a user's star level
pub async fn set_star(pool: &SqlitePool, id: &UserId, star: u32) -> Result<()> {
    let result = sqlx::query("UPDATE users SET star = ? WHERE id = ?")
        .bind(i64::from(star))
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("user", id.as_str()));
    }

    Ok(())
}

/// Grant or revoke moderator rights
pub async fn set_moderator(pool: &SqlitePool, id: &UserId, is_moderator: bool) -> Result<()> {
    let result = sqlx::query("UPDATE users SET is_moderator = ? WHERE id = ?")
        .bind(is_moderator)
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("user", id.as_str()));
    }

    Ok(())
}
