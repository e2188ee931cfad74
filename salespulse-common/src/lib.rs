//! # SalesPulse Common Library
//!
//! Framework-free code shared by the SalesPulse service:
//! - Configuration loading
//! - Database schema, seeding and queries
//! - Password hashing and bearer tokens
//! - Lead scoring, sentiment tagging and dashboard aggregation
//! - CSV report export
//! - Generative chat client

pub mod analysis;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod report;

pub use error::{Error, Result};
