//! HTTP API handlers

pub mod assist;
pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod leads;
pub mod products;
pub mod users;

pub use assist::{chat, check_grammar};
pub use auth::{auth_middleware, dev_only, login, manager_only, register, salesperson_only, CurrentUser};
pub use dashboard::{dashboard, download_report};
pub use extract::{ApiJson, ApiPath};
pub use health::health_routes;
pub use leads::{analyze_feedback, predict_lead, submit_lead};
pub use products::{add_product, delete_product, list_products};
pub use users::{add_user, delete_user, list_logs, list_users};
