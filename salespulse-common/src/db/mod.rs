//! Database schema, seeding and queries

pub mod activity;
pub mod dashboard;
pub mod feedback;
pub mod init;
pub mod models;
pub mod products;
pub mod seed;
pub mod users;

pub use init::*;
pub use models::*;

use chrono::{NaiveDateTime, Utc};

/// Current UTC wall-clock time as stored in the database
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
