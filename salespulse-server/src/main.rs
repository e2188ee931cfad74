//! SalesPulse server - main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use salespulse_common::analysis::lead::{LeadClassifier, LinearTextModel};
use salespulse_common::analysis::sentiment::{analyzer_for, SentimentMode};
use salespulse_common::auth::TokenSigner;
use salespulse_common::chat::GeminiClient;
use salespulse_common::config::{load_toml_config, AppConfig, ConfigOverrides};
use salespulse_common::db::{init_database, seed::seed_defaults};
use salespulse_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for salespulse-server
#[derive(Parser, Debug)]
#[command(name = "salespulse-server")]
#[command(about = "Sales enablement service: lead scoring, feedback sentiment, manager dashboard")]
#[command(version)]
struct Args {
    /// TOML config file (default: ~/.config/salespulse/config.toml when present)
    #[arg(short, long, env = "SALESPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SALESPULSE_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SALESPULSE_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "SALESPULSE_DATABASE")]
    database: Option<PathBuf>,

    /// sqlite: database URL (used when --database is not given)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Token signing secret
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Lead classifier artifact (JSON)
    #[arg(long, env = "LEAD_MODEL_PATH")]
    lead_model: Option<PathBuf>,

    /// Google Generative Language API key for the chat assistant
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    /// Sentiment analyzer: polarity or lexicon_vote
    #[arg(long, env = "SALESPULSE_SENTIMENT_MODE")]
    sentiment_mode: Option<SentimentMode>,

    /// Skip the demo leads and feedback on a fresh database
    #[arg(long, env = "SALESPULSE_NO_DEMO_DATA")]
    no_demo_data: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_addr: self.bind_addr.clone(),
            port: self.port,
            database_path: self.database.clone(),
            database_url: self.database_url.clone(),
            secret_key: self.secret_key.clone(),
            lead_model_path: self.lead_model.clone(),
            google_api_key: self.google_api_key.clone(),
            sentiment_mode: self.sentiment_mode,
            seed_demo_data: self.no_demo_data.then_some(false),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salespulse_server=info,salespulse_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting SalesPulse server v{}", env!("CARGO_PKG_VERSION"));

    let file_config = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let config =
        AppConfig::resolve(args.overrides(), file_config).context("Invalid configuration")?;
    if config.uses_dev_secret() {
        warn!("Tokens are signed with the development key; set SECRET_KEY in production");
    }

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    seed_defaults(&pool, config.seed_demo_data)
        .await
        .context("Failed to seed database")?;

    let signer = TokenSigner::new(&config.secret_key, config.token_ttl_hours);
    let sentiment = analyzer_for(config.sentiment_mode);
    info!("Sentiment analyzer: {:?}", config.sentiment_mode);

    let mut state = AppState::new(pool, signer, sentiment);

    if let Some(model) = load_lead_model(&config) {
        state = state.with_lead_model(model);
    }

    match &config.google_api_key {
        Some(key) => {
            let client = GeminiClient::new(key.clone(), config.chat_models.clone())
                .context("Failed to create chat client")?;
            info!("Chat assistant enabled ({} candidate models)", config.chat_models.len());
            state = state.with_chat(Arc::new(client));
        }
        None => warn!("GOOGLE_API_KEY not set; chat assistant disabled"),
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("SalesPulse listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Load the classifier; the service runs unscored without one
fn load_lead_model(config: &AppConfig) -> Option<Arc<dyn LeadClassifier>> {
    let Some(path) = &config.lead_model_path else {
        warn!("No lead model configured (LEAD_MODEL_PATH); leads will be stored unscored");
        return None;
    };

    match LinearTextModel::load(path) {
        Ok(model) => Some(Arc::new(model)),
        Err(e) => {
            warn!("Lead model unavailable ({}): {}", path.display(), e);
            None
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
