// ============================================
// File: crates/airrelay-agent/src/lib.rs
// ============================================
//! # Airrelay Agent Library
//!
//! ## Creation Reason
//! Hosts everything around the core polling/forwarding logic: the
//! configuration layer, the cycle scheduler, and the one-shot report
//! type the CLI prints in `once` mode.
//!
//! ## Main Functionality
//! - [`config`]: TOML + environment configuration
//! - [`scheduler`]: the fetch-then-forward cycle and the timer loop
//! - [`error`]: agent-specific error types
//!
//! ## Data Flow
//! ```text
//! tick ──► Relay::run ──► SensorClient::fetch_status ──► Forwarder::forward
//!              │
//!              └─► CycleReport (logged; printed as JSON in `once` mode)
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial agent library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod scheduler;

// Re-export primary types
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use scheduler::{Cycle, CycleReport, Relay, Scheduler};
