//! Configuration loading and resolution
//!
//! Values resolve in priority order:
//! 1. Command-line argument / environment variable (both arrive via [`ConfigOverrides`])
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::analysis::sentiment::SentimentMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Signing key used when no secret is configured. Never acceptable in production.
pub const DEV_SECRET_KEY: &str = "salespulse-dev-secret-change-this";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Gemini models probed in order until one answers
pub const DEFAULT_CHAT_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash-exp",
    "gemini-1.5-flash",
    "gemini-pro",
];

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub secret_key: Option<String>,
    pub lead_model_path: Option<PathBuf>,
    pub google_api_key: Option<String>,
    pub chat_models: Option<Vec<String>>,
    pub sentiment_mode: Option<SentimentMode>,
    pub seed_demo_data: Option<bool>,
    pub token_ttl_hours: Option<i64>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    /// `DATABASE_URL`; only `sqlite:` URLs are accepted
    pub database_url: Option<String>,
    pub secret_key: Option<String>,
    pub lead_model_path: Option<PathBuf>,
    pub google_api_key: Option<String>,
    pub sentiment_mode: Option<SentimentMode>,
    pub seed_demo_data: Option<bool>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub secret_key: String,
    pub lead_model_path: Option<PathBuf>,
    pub google_api_key: Option<String>,
    pub chat_models: Vec<String>,
    pub sentiment_mode: SentimentMode,
    pub seed_demo_data: bool,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let database_path = match (overrides.database_path, overrides.database_url) {
            (Some(path), _) => path,
            (None, Some(url)) => database_path_from_url(&url)?,
            (None, None) => file
                .database_path
                .unwrap_or_else(default_database_path),
        };

        let secret_key = overrides
            .secret_key
            .or(file.secret_key)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                warn!("No secret key configured; using the development key");
                DEV_SECRET_KEY.to_string()
            });

        let token_ttl_hours = file.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        if token_ttl_hours <= 0 {
            return Err(Error::Config(format!(
                "token_ttl_hours must be positive, got {}",
                token_ttl_hours
            )));
        }

        let chat_models = file
            .chat_models
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODELS.iter().map(|m| m.to_string()).collect());

        Ok(Self {
            bind_addr: overrides
                .bind_addr
                .or(file.bind_addr)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path,
            secret_key,
            lead_model_path: overrides.lead_model_path.or(file.lead_model_path),
            google_api_key: overrides
                .google_api_key
                .or(file.google_api_key)
                .filter(|k| !k.trim().is_empty()),
            chat_models,
            sentiment_mode: overrides
                .sentiment_mode
                .or(file.sentiment_mode)
                .unwrap_or_default(),
            seed_demo_data: overrides.seed_demo_data.or(file.seed_demo_data).unwrap_or(true),
            token_ttl_hours,
        })
    }

    /// True when tokens are signed with [`DEV_SECRET_KEY`]
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}

/// Read the TOML config file
///
/// An explicit path must exist. Without one, the per-user config file is
/// used when present and defaults otherwise.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_file() {
            Some(path) if path.exists() => path,
            _ => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Translate a `sqlite:` database URL into a file path
pub fn database_path_from_url(url: &str) -> Result<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .ok_or_else(|| {
            Error::Config(format!(
                "Unsupported DATABASE_URL '{}': only sqlite: URLs are supported",
                url
            ))
        })?;

    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() {
        return Err(Error::Config(format!("DATABASE_URL '{}' has no path", url)));
    }
    Ok(PathBuf::from(path))
}

/// Per-user config file location (`~/.config/salespulse/config.toml` on Linux)
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("salespulse").join("config.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("salespulse"))
        .unwrap_or_else(|| PathBuf::from("./salespulse_data"))
        .join("salespulse.db")
}
