//! Append-only activity log

use super::models::ActivityLog;
use super::now;
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};

/// Default page size for the log viewer
pub const RECENT_LOG_LIMIT: i64 = 100;

/// Append one audit entry on an existing connection or transaction
pub async fn log_activity_on(
    conn: &mut SqliteConnection,
    user_id: i64,
    action: &str,
    details: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO activity_logs (user_id, action, details, timestamp) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(now())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn log_activity(pool: &SqlitePool, user_id: i64, action: &str, details: &str) -> Result<()> {
    let mut conn = pool.acquire().await?;
    log_activity_on(&mut conn, user_id, action, details).await
}

/// Newest entries first
pub async fn recent_logs(pool: &SqlitePool, limit: i64) -> Result<Vec<ActivityLog>> {
    let logs = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT l.id, l.user_id, u.username, l.action, l.details, l.timestamp
        FROM activity_logs l
        JOIN users u ON u.id = l.user_id
        ORDER BY l.timestamp DESC, l.id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(logs)
}

pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
