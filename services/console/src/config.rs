//! services/console/src/config.rs
//!
//! Defines the console's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use fieldtest_core::report_doc::StampOffset;
use std::net::SocketAddr;
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
    pub bind_address: SocketAddr,
    pub api_base_url: String,
    pub log_level: Level,
    pub page_size: u32,
    pub stamp_offset: StampOffset,
    pub secure_cookies: bool,
    pub session_idle: Duration,
    pub max_sessions: usize,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server Settings ---
        let bind_address = parse_var::<SocketAddr>("BIND_ADDRESS", "0.0.0.0:8080")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let secure_cookies = parse_var::<bool>("SECURE_COOKIES", "false")?;

        // --- Sessions ---
        let idle_minutes = parse_var::<u64>("SESSION_IDLE_MINUTES", "480")?;
        if idle_minutes == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_IDLE_MINUTES".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let max_sessions = parse_var::<usize>("MAX_SESSIONS", "10000")?;
        if max_sessions == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_SESSIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Remote API ---
        let api_base_url = std::env::var("API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("API_BASE_URL".to_string()))?;
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }

        // --- Screens & Documents ---
        let page_size = parse_var::<u32>("PAGE_SIZE", "10")?;
        if !(1..=100).contains(&page_size) {
            return Err(ConfigError::InvalidValue(
                "PAGE_SIZE".to_string(),
                format!("{} is outside 1..=100", page_size),
            ));
        }

        let stamp_offset = StampOffset {
            x_px: parse_var::<f32>("STAMP_OFFSET_X", "420")?,
            y_px: parse_var::<f32>("STAMP_OFFSET_Y", "160")?,
        };

        Ok(Self {
            bind_address,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            log_level,
            page_size,
            stamp_offset,
            secure_cookies,
            session_idle: Duration::from_secs(idle_minutes * 60),
            max_sessions,
        })
    }

    /// A configuration for tests and local tooling that never touches the environment.
    pub fn for_api(api_base_url: &str) -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            log_level: Level::INFO,
            page_size: 10,
            stamp_offset: StampOffset {
                x_px: 420.0,
                y_px: 160.0,
            },
            secure_cookies: false,
            session_idle: Duration::from_secs(8 * 60 * 60),
            max_sessions: 10_000,
        }
    }
}
