// ============================================
// File: crates/airrelay-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! One taxonomy for everything that can go wrong while talking to the
//! sensor API or the ingestion endpoint, so the scheduler can catch any
//! failure at the cycle boundary and log it without terminating.
//!
//! ## Main Functionality
//! - `CoreError`: error enum for sensor/forward operations
//! - `Result<T>`: type alias using `CoreError`
//!
//! ## Design Philosophy
//! - Use `thiserror` for ergonomic error definitions
//! - Network failures, HTTP status failures, and API-level failures are
//!   distinct variants: they are logged differently and tested separately
//! - Errors never carry credentials or signed tokens
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors from sensor polling and forwarding.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Network-level failure (DNS, connection refused, timeout).
    #[error("Transport error during {context}: {source}")]
    Transport {
        /// What request was being made
        context: String,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// Remote returned a non-2xx HTTP status.
    #[error("HTTP {status} from {context}: {body}")]
    Http {
        /// What request was being made
        context: String,
        /// HTTP status code
        status: u16,
        /// Response body (truncated upstream if large)
        body: String,
    },

    /// SwitchBot replied 2xx but with its own failure sentinel
    /// (`statusCode != 100`).
    #[error("SwitchBot API error {status_code}: {message}")]
    Api {
        /// API-level status code from the response envelope
        status_code: i64,
        /// Message supplied by the API
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Decode error for {context}: {details}")]
    Decode {
        /// What was being decoded
        context: String,
        /// Error details
        details: String,
    },
}

impl CoreError {
    /// Creates a `Transport` error with context.
    pub fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    /// Creates an `Http` error.
    pub fn http(context: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            context: context.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a `Decode` error.
    pub fn decode(context: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            details: details.into(),
        }
    }

    /// Returns `true` if the failure is plausibly transient.
    ///
    /// Transient failures are logged at `warn` by the scheduler; the rest
    /// (API rejections, decode failures) indicate a configuration or
    /// upstream contract problem and are logged at `error`.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Http { .. })
    }
}

// ============================================
// Tests
// ============================================
