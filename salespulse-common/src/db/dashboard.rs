//! Manager dashboard aggregation

use super::feedback::{
    count_by_lead_label, count_by_sentiment_label, count_feedback, count_since, lead_texts,
    recent_feedback, timestamps_since,
};
use super::models::{Feedback, Role};
use super::users::count_by_role;
use crate::analysis::lead::LeadLabel;
use crate::analysis::sentiment::SentimentLabel;
use crate::analysis::trends::{daily_trend, window_start, Trend, TREND_DAYS};
use crate::analysis::wordcloud::{select_source, word_frequencies, WordCount, WORDCLOUD_LIMIT};
use crate::Result;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

/// Rows shown in the "recent" panel
pub const RECENT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct LeadCounts {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub week: i64,
    pub active_sales: i64,
    pub leads: LeadCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentCounts {
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub sentiment: SentimentCounts,
    pub wordcloud_data: Vec<WordCount>,
    pub trends: Trend,
    pub recent: Vec<Feedback>,
}

/// Assemble every dashboard panel as of `now`
pub async fn build_dashboard(pool: &sqlx::SqlitePool, now: NaiveDateTime) -> Result<DashboardSummary> {
    let stats = DashboardStats {
        total: count_feedback(pool).await?,
        week: count_since(pool, now - Duration::days(TREND_DAYS)).await?,
        active_sales: count_by_role(pool, Role::Salesperson).await?,
        leads: LeadCounts {
            high: count_by_lead_label(pool, LeadLabel::High).await?,
            medium: count_by_lead_label(pool, LeadLabel::Medium).await?,
            low: count_by_lead_label(pool, LeadLabel::Low).await?,
        },
    };

    let sentiment = SentimentCounts {
        positive: count_by_sentiment_label(pool, SentimentLabel::Positive).await?,
        neutral: count_by_sentiment_label(pool, SentimentLabel::Neutral).await?,
        negative: count_by_sentiment_label(pool, SentimentLabel::Negative).await?,
    };

    let high = lead_texts(pool, Some(LeadLabel::High)).await?;
    let labelled = lead_texts(pool, None).await?;
    let wordcloud_data = word_frequencies(select_source(&high, &labelled), WORDCLOUD_LIMIT);

    let stamps = timestamps_since(pool, window_start(now, TREND_DAYS)).await?;
    let trends = daily_trend(now, &stamps, TREND_DAYS);

    let recent = recent_feedback(pool, RECENT_LIMIT).await?;

    debug!(
        total = stats.total,
        week = stats.week,
        cloud_words = wordcloud_data.len(),
        "Dashboard assembled"
    );

    Ok(DashboardSummary {
        stats,
        sentiment,
        wordcloud_data,
        trends,
        recent,
    })
}
