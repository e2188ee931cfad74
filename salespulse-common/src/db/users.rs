//! User account queries

use super::models::{Role, User};
use super::now;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, password_hash, role, last_login, created_at";

/// Insert a new account. A taken username is `InvalidInput`.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let created_at = now();
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, role, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .bind(created_at)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            last_login: None,
            created_at,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(Error::InvalidInput("Username already exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Login lookup: the account must exist under the requested role
pub async fn find_for_login(pool: &SqlitePool, username: &str, role: Role) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = ? AND role = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .bind(role)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
        .fetch_all(pool)
        .await?;
    Ok(users)
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64, at: NaiveDateTime) -> Result<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an account and, through the foreign keys, its feedback and log rows.
/// Returns false when no such user exists.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_by_role(pool: &SqlitePool, role: Role) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
