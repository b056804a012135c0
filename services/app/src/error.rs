//! services/app/src/error.rs
//!
//! Defines the primary error type for the entire `app` service.

use crate::config::ConfigError;
use storybook_core::domain::ValidationError;
use storybook_core::ports::PortError;

/// The primary error type for the `app` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a form that failed its submission check.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
