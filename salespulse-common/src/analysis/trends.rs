//! Day-bucketed submission counts for the dashboard trend chart

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Number of calendar days on the trend chart (today included)
pub const TREND_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    /// `MM/DD`, oldest first
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

/// Midnight starting the oldest bucket
pub fn window_start(now: NaiveDateTime, days: i64) -> NaiveDateTime {
    (now.date() - Duration::days(days - 1)).and_time(NaiveTime::MIN)
}

/// Count `timestamps` per calendar day over the `days` days ending today
pub fn daily_trend(now: NaiveDateTime, timestamps: &[NaiveDateTime], days: i64) -> Trend {
    let today = now.date();
    let buckets: Vec<NaiveDate> = (0..days)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect();

    let data = buckets
        .iter()
        .map(|day| timestamps.iter().filter(|ts| ts.date() == *day).count() as i64)
        .collect();
    let labels = buckets
        .iter()
        .map(|day| day.format("%m/%d").to_string())
        .collect();

    Trend { labels, data }
}
