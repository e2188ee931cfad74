//! Database models

use crate::analysis::lead::LeadLabel;
use crate::analysis::sentiment::SentimentLabel;
use crate::Error;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Salesperson,
    Manager,
    Dev,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Salesperson => "salesperson",
            Role::Manager => "manager",
            Role::Dev => "dev",
        }
    }

    /// Roles a visitor may pick when registering without a `dev` account
    pub fn self_registrable(&self) -> bool {
        matches!(self, Role::Salesperson | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "salesperson" => Ok(Role::Salesperson),
            "manager" => Ok(Role::Manager),
            "dev" => Ok(Role::Dev),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Account row. The password hash never leaves the database layer in JSON.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Lead or feedback submission, joined with the owner's username
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub salesperson: String,
    pub salesperson_id: i64,
    pub text: String,
    pub timestamp: NaiveDateTime,
    pub status: String,
    pub lead_score: Option<f64>,
    pub lead_label: Option<LeadLabel>,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
}

/// Fields for a new feedback row; the score pair that is unset stays NULL
#[derive(Debug, Clone, Default)]
pub struct NewFeedback {
    pub salesperson_id: i64,
    pub text: String,
    pub status: String,
    pub lead_score: Option<f64>,
    pub lead_label: Option<LeadLabel>,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
    /// Defaults to now when unset
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub details: Option<String>,
    pub catalogue_info: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub catalogue_info: String,
}

/// Audit trail entry, joined with the acting user's name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub action: String,
    pub details: Option<String>,
    pub timestamp: NaiveDateTime,
}
