//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Every timing value the engine uses is a
//! configuration default rather than a hard-coded constant.

use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub backend_base_url: String,
    pub request_timeout: Duration,
    pub log_level: Level,
    pub storage_dir: PathBuf,
    /// How long a persisted form survives before it is purged on read.
    pub form_retention: chrono::Duration,
    /// The quiet period after the last form edit before the form is persisted.
    pub form_debounce: Duration,
    /// The period of the reader's auto-advance timer.
    pub auto_advance_period: Duration,
    /// How long the reader must sit on the last page (reached manually)
    /// before end-of-story actions are revealed.
    pub end_actions_dwell: Duration,
    /// How long a status notification stays up without a manual dismissal.
    pub notification_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let backend_base_url = std::env::var("BACKEND_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let request_timeout =
            Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let storage_dir = std::env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage"));

        let form_retention =
            chrono::Duration::hours(parse_var("FORM_RETENTION_HOURS", 6)? as i64);
        let form_debounce = Duration::from_millis(parse_var("FORM_DEBOUNCE_MS", 1_000)?);
        let auto_advance_period =
            Duration::from_millis(parse_var("AUTO_ADVANCE_MS", 5_000)?);
        let end_actions_dwell =
            Duration::from_millis(parse_var("END_ACTIONS_DWELL_MS", 2_000)?);
        let notification_ttl =
            Duration::from_millis(parse_var("NOTIFICATION_TTL_MS", 8_000)?);

        Ok(Self {
            backend_base_url,
            request_timeout,
            log_level,
            storage_dir,
            form_retention,
            form_debounce,
            auto_advance_period,
            end_actions_dwell,
            notification_ttl,
        })
    }
}

/// Reads an optional numeric environment variable, falling back to a default.
fn parse_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                name.to_string(),
                format!("'{}' is not a valid number", raw),
            )
        }),
    }
}
