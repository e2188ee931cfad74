//! Lead and feedback submissions

use super::activity::log_activity_on;
use super::models::{Feedback, NewFeedback};
use super::now;
use crate::analysis::lead::LeadLabel;
use crate::analysis::sentiment::SentimentLabel;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};

const FEEDBACK_SELECT: &str = r#"
    SELECT f.id, u.username AS salesperson, f.salesperson_id, f.text, f.timestamp, f.status,
           f.lead_score, f.lead_label, f.sentiment_score, f.sentiment_label
    FROM feedbacks f
    JOIN users u ON u.id = f.salesperson_id
"#;

/// Insert one row on an existing connection or transaction, returning its id
pub async fn insert_feedback_on(conn: &mut SqliteConnection, new: &NewFeedback) -> Result<i64> {
    let status = if new.status.is_empty() { "pending" } else { new.status.as_str() };
    let result = sqlx::query(
        r#"
        INSERT INTO feedbacks
            (salesperson_id, text, timestamp, status, lead_score, lead_label, sentiment_score, sentiment_label)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.salesperson_id)
    .bind(&new.text)
    .bind(new.timestamp.unwrap_or_else(now))
    .bind(status)
    .bind(new.lead_score)
    .bind(new.lead_label)
    .bind(new.sentiment_score)
    .bind(new.sentiment_label)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Store a submission and its audit entry in one transaction.
///
/// `details` receives the new row id and returns the log text.
pub async fn submit_feedback<F>(
    pool: &SqlitePool,
    new: &NewFeedback,
    action: &str,
    details: F,
) -> Result<i64>
where
    F: FnOnce(i64) -> String,
{
    let mut tx = pool.begin().await?;
    let id = insert_feedback_on(&mut tx, new).await?;
    log_activity_on(&mut tx, new.salesperson_id, action, &details(id)).await?;
    tx.commit().await?;
    Ok(id)
}

pub async fn get_feedback(pool: &SqlitePool, id: i64) -> Result<Feedback> {
    sqlx::query_as::<_, Feedback>(&format!("{} WHERE f.id = ?", FEEDBACK_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Feedback {}", id)))
}

/// Newest rows first, at most `limit`
pub async fn recent_feedback(pool: &SqlitePool, limit: i64) -> Result<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>(&format!(
        "{} ORDER BY f.timestamp DESC, f.id DESC LIMIT ?",
        FEEDBACK_SELECT
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every row, newest first
pub async fn all_feedback(pool: &SqlitePool) -> Result<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>(&format!(
        "{} ORDER BY f.timestamp DESC, f.id DESC",
        FEEDBACK_SELECT
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_feedback(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_since(pool: &SqlitePool, since: NaiveDateTime) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks WHERE timestamp >= ?")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks WHERE salesperson_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_by_lead_label(pool: &SqlitePool, label: LeadLabel) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks WHERE lead_label = ?")
        .bind(label)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_by_sentiment_label(pool: &SqlitePool, label: SentimentLabel) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks WHERE sentiment_label = ?")
        .bind(label)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Texts of rows carrying the given lead label, or any lead label when `None`
pub async fn lead_texts(pool: &SqlitePool, label: Option<LeadLabel>) -> Result<Vec<String>> {
    let texts: Vec<String> = match label {
        Some(label) => {
            sqlx::query_scalar("SELECT text FROM feedbacks WHERE lead_label = ? ORDER BY id")
                .bind(label)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT text FROM feedbacks WHERE lead_label IS NOT NULL ORDER BY id")
                .fetch_all(pool)
                .await?
        }
    };
    Ok(texts)
}

pub async fn timestamps_since(pool: &SqlitePool, since: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
    let stamps: Vec<NaiveDateTime> =
        sqlx::query_scalar("SELECT timestamp FROM feedbacks WHERE timestamp >= ?")
            .bind(since)
            .fetch_all(pool)
            .await?;
    Ok(stamps)
}
