//! services/console/src/error.rs
//!
//! Defines the primary error type for the console service.

use crate::config::ConfigError;
use fieldtest_core::ports::PortError;

/// The primary error type for the `console` service.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a failure building or using the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a failure while producing a PDF document.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<ConsoleError> for PortError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Port(e) => e,
            other => PortError::Unexpected(other.to_string()),
        }
    }
}
