// ============================================
// File: crates/airrelay-core/src/sensor.rs
// ============================================
//! # SwitchBot Sensor Client
//!
//! ## Creation Reason
//! Fetches the current status of one SwitchBot meter over the v1.1 REST
//! API and normalizes it into a [`Reading`].
//!
//! ## Main Functionality
//! - `Credentials`: token/secret/device id, immutable for process lifetime
//! - `SensorClient`: signed HTTP client for the SwitchBot API
//! - `parse_status`: pure envelope/body parsing with the CO2 key shim
//!
//! ## Request Flow
//! ```text
//! fetch_status()
//!     │
//!     ├─ auth::sign()           fresh token per call, never cached
//!     ├─ GET {base}/devices/{device_id}/status
//!     │     headers: Authorization, Content-Type, charset, t, sign, nonce
//!     ├─ non-2xx        → CoreError::Http
//!     ├─ statusCode≠100 → CoreError::Api
//!     └─ body           → Reading { temperature?, humidity?, co2? }
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The CO2 key differs across firmware revisions. Resolution order is
//!   `CO2`, then `co2`, then `carbonDioxide`. Preserve this order.
//! - Absent fields must stay `None`; never default them to zero, the
//!   ingestion side distinguishes "omitted" from "0"
//!
//! ## Last Modified
//! v0.1.0 - Initial sensor client

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::auth;
use crate::error::{CoreError, Result};

// ============================================
// Constants
// ============================================

/// Default SwitchBot API base URL.
pub const DEFAULT_SENSOR_BASE_URL: &str = "https://api.switch-bot.com/v1.1";

/// API-level success sentinel in the response envelope.
const API_STATUS_SUCCESS: i64 = 100;

/// HTTP request timeout. The upstream API answers in well under a second;
/// 10s bounds a hung connection without risking a healthy slow response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================
// Credentials
// ============================================

/// SwitchBot API credentials for one device.
///
/// Supplied by configuration at startup; never persisted by this crate.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Public API token (also the Bearer token).
    pub token: String,
    /// Shared signing secret.
    pub secret: String,
    /// Device identifier to poll.
    pub device_id: String,
}

// ============================================
// Reading
// ============================================

/// Normalized sensor measurement.
///
/// Each field is `None` when the sensor omitted it from the response
/// body. `None` is carried through to forwarding, where the field is
/// left out of the query string entirely.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// CO2 concentration in ppm.
    pub co2: Option<f64>,
}

impl Reading {
    /// Returns `true` if the sensor reported none of the three fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none() && self.co2.is_none()
    }
}

// ============================================
// Response Envelope
// ============================================

/// SwitchBot v1.1 response envelope.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(rename = "statusCode")]
    status_code: i64,
    #[serde(default)]
    message: String,
    body: Option<Value>,
}

/// Parses a SwitchBot status response body into a [`Reading`].
///
/// # Errors
/// - [`CoreError::Decode`] if the body is not a valid envelope
/// - [`CoreError::Api`] if the envelope carries `statusCode != 100`
pub fn parse_status(raw: &str) -> Result<Reading> {
    let envelope: StatusEnvelope = serde_json::from_str(raw)
        .map_err(|e| CoreError::decode("sensor status envelope", e.to_string()))?;

    if envelope.status_code != API_STATUS_SUCCESS {
        return Err(CoreError::Api {
            status_code: envelope.status_code,
            message: envelope.message,
        });
    }

    let body = envelope
        .body
        .ok_or_else(|| CoreError::decode("sensor status envelope", "missing 'body' field"))?;

    Ok(Reading {
        temperature: field_f64(&body, "temperature"),
        humidity: field_f64(&body, "humidity"),
        co2: resolve_co2(&body),
    })
}

fn field_f64(body: &Value, key: &str) -> Option<f64> {
    body.get(key).and_then(Value::as_f64)
}

/// Resolves the CO2 value across firmware naming variants.
///
/// The key differs between API versions and device firmware; the first
/// *present* key wins, in the order `CO2`, `co2`, `carbonDioxide`.
fn resolve_co2(body: &Value) -> Option<f64> {
    for key in ["CO2", "co2", "carbonDioxide"] {
        if let Some(value) = body.get(key) {
            return value.as_f64();
        }
    }
    None
}

// ============================================
// SensorClient
// ============================================

/// Signed HTTP client for the SwitchBot v1.1 API.
pub struct SensorClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl SensorClient {
    /// Creates a client against the production SwitchBot API.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_SENSOR_BASE_URL)
    }

    /// Creates a client against an explicit base URL (used by tests).
    #[must_use]
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Fetches the current status of the configured device.
    ///
    /// # Errors
    /// Returns [`CoreError::Transport`], [`CoreError::Http`],
    /// [`CoreError::Api`], or [`CoreError::Decode`] per failure class.
    pub async fn fetch_status(&self) -> Result<Reading> {
        let url = format!(
            "{}/devices/{}/status",
            self.base_url, self.credentials.device_id
        );
        let raw = self.get_signed(&url, "sensor status").await?;
        let reading = parse_status(&raw)?;
        debug!(?reading, "Sensor status fetched");
        Ok(reading)
    }

    /// Lists all devices visible to the configured token.
    ///
    /// Thin wrapper over `GET /devices` with the same signed headers;
    /// backs the `devices` CLI subcommand.
    ///
    /// # Errors
    /// Same failure classes as [`Self::fetch_status`].
    pub async fn list_devices(&self) -> Result<Value> {
        let url = format!("{}/devices", self.base_url);
        let raw = self.get_signed(&url, "device list").await?;
        serde_json::from_str(&raw)
            .map_err(|e| CoreError::decode("device list", e.to_string()))
    }

    /// Issues a signed GET and returns the body on a 2xx status.
    async fn get_signed(&self, url: &str, context: &str) -> Result<String> {
        // Fresh token per request; the API rejects reused nonces.
        let token = auth::sign(&self.credentials.token, &self.credentials.secret);

        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.credentials.token))
            .header("Content-Type", "application/json")
            .header("charset", "utf8")
            .header("t", token.timestamp_ms.to_string())
            .header("sign", &token.signature)
            .header("nonce", &token.nonce)
            .send()
            .await
            .map_err(|e| CoreError::transport(context.to_string(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::transport(context.to_string(), e))?;

        if !status.is_success() {
            return Err(CoreError::http(context.to_string(), status.as_u16(), body));
        }

        Ok(body)
    }
}

impl std::fmt::Debug for SensorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorClient")
            .field("base_url", &self.base_url)
            .field("device_id", &self.credentials.device_id)
            .finish()
    }
}

// ============================================
// Tests
// ============================================
