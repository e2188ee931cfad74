//! SalesPulse HTTP service
//!
//! Lead scoring, feedback sentiment, manager dashboard and admin endpoints
//! over a SQLite database. Everything except login, registration and the
//! health check requires a bearer token.

use axum::Router;
use salespulse_common::analysis::lead::LeadClassifier;
use salespulse_common::analysis::sentiment::SentimentAnalyzer;
use salespulse_common::auth::TokenSigner;
use salespulse_common::chat::ChatModel;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub signer: Arc<TokenSigner>,
    /// Absent when no classifier artifact could be loaded
    pub lead_model: Option<Arc<dyn LeadClassifier>>,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
    /// Absent when no API key is configured
    pub chat: Option<Arc<dyn ChatModel>>,
}

impl AppState {
    pub fn new(db: SqlitePool, signer: TokenSigner, sentiment: Arc<dyn SentimentAnalyzer>) -> Self {
        Self {
            db,
            signer: Arc::new(signer),
            lead_model: None,
            sentiment,
            chat: None,
        }
    }

    pub fn with_lead_model(mut self, model: Arc<dyn LeadClassifier>) -> Self {
        self.lead_model = Some(model);
        self
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.chat = Some(chat);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let dev = || middleware::from_fn(api::dev_only);
    let manager = || middleware::from_fn(api::manager_only);
    let sales = || middleware::from_fn(api::salesperson_only);

    // Protected routes: bearer token on all, role gates per method so they
    // run before body extraction
    let protected = Router::new()
        .route("/api/submit-lead", post(api::submit_lead).route_layer(sales()))
        .route("/api/analyze-feedback", post(api::analyze_feedback).route_layer(sales()))
        .route("/api/feedback", post(api::analyze_feedback).route_layer(sales()))
        .route("/api/check-grammar", post(api::check_grammar).route_layer(sales()))
        .route("/api/predict-lead", post(api::predict_lead))
        .route("/api/chat", post(api::chat))
        .route(
            "/api/products",
            get(api::list_products).merge(post(api::add_product).route_layer(dev())),
        )
        .route("/api/products/:id", delete(api::delete_product).route_layer(dev()))
        .route("/api/dashboard", get(api::dashboard).route_layer(manager()))
        .route("/api/download-report", get(api::download_report).route_layer(manager()))
        .route(
            "/api/users",
            get(api::list_users).post(api::add_user).route_layer(dev()),
        )
        .route("/api/users/:id", delete(api::delete_user).route_layer(dev()))
        .route("/api/logs", get(api::list_logs).route_layer(dev()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes
    let public = Router::new()
        .route("/api/login", post(api::login))
        .route("/api/register", post(api::register))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
