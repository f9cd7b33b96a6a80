// ============================================
// File: crates/airrelay-agent/src/error.rs
// ============================================
//! # Agent Error Types
//!
//! Configuration failures are fatal at startup; everything wrapped from
//! [`CoreError`] is caught at the cycle boundary by the scheduler.

use thiserror::Error;

use airrelay_core::CoreError;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        /// Path that was being loaded
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        /// Offending field
        field: String,
        /// Why it is invalid
        reason: String,
    },

    /// A required configuration value is missing after merging file and
    /// environment sources.
    #[error("Missing required configuration: {field}")]
    ConfigMissing {
        /// Missing field
        field: String,
    },

    /// Error from the core polling/forwarding layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Creates a `ConfigLoad` error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConfigInvalid` error.
    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConfigMissing` error.
    pub fn config_missing(field: impl Into<String>) -> Self {
        Self::ConfigMissing {
            field: field.into(),
        }
    }
}
