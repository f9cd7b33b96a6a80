// ============================================
// File: crates/airrelay-core/src/lib.rs
// ============================================
//! # Airrelay Core - Sensor Polling and Forwarding Library
//!
//! ## Creation Reason
//! Provides the protocol-facing half of the airrelay agent: SwitchBot
//! request signing, the sensor status client, and the ThingSpeak
//! forwarder. The agent crate owns configuration and scheduling.
//!
//! ## Main Functionality
//! - [`auth`]: HMAC-SHA256 request signing (timestamp + nonce + signature)
//! - [`sensor`]: Signed `GET /devices/{id}/status` client and body parsing
//! - [`forward`]: ThingSpeak `GET /update` forwarder
//! - [`error`]: Core error taxonomy
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              airrelay-agent                         │
//! │   (config, scheduler, CLI, one-shot runner)         │
//! │                    │                                │
//! │                    ▼                                │
//! │             airrelay-core  ◄── You are here         │
//! │   ┌──────────┐  ┌────────────┐  ┌───────────┐      │
//! │   │   auth   │──│   sensor   │  │  forward  │      │
//! │   │ (signer) │  │  (client)  │  │ (ingest)  │      │
//! │   └──────────┘  └────────────┘  └───────────┘      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The signature headers (`t`, `sign`, `nonce`) and the signing string
//!   `token || t || nonce` are a contract with the SwitchBot v1.1 API
//! - A fresh AuthToken is generated per request; never cache one
//! - Absent sensor fields stay `None` end to end; ThingSpeak must be able
//!   to distinguish "field omitted" from "value is zero"
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod error;
pub mod forward;
pub mod sensor;

// Re-export commonly used items at crate root
pub use auth::AuthToken;
pub use error::{CoreError, Result};
pub use forward::Forwarder;
pub use sensor::{Reading, SensorClient};
