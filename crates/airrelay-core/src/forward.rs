// ============================================
// File: crates/airrelay-core/src/forward.rs
// ============================================
//! # ThingSpeak Forwarder
//!
//! ## Creation Reason
//! Pushes a normalized [`Reading`] to the ThingSpeak ingestion endpoint
//! as a `GET /update` with query parameters.
//!
//! ## Field Mapping
//! ```text
//! temperature → field1
//! humidity    → field2
//! co2         → field3
//! ```
//! The positional mapping is fixed by the ThingSpeak channel contract.
//! Absent fields are omitted from the query string entirely, never sent
//! as empty strings or zeros.
//!
//! ## Last Modified
//! v0.1.0 - Initial forwarder

use std::time::Duration;

use tracing::info;

use crate::error::{CoreError, Result};
use crate::sensor::Reading;

/// Default ThingSpeak API base URL.
pub const DEFAULT_INGEST_BASE_URL: &str = "https://api.thingspeak.com";

/// HTTP request timeout, matching the sensor client's bound.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the `update` query pairs for a reading.
///
/// Only present fields are emitted; ThingSpeak treats a missing `fieldN`
/// as "no data point", which is the correct rendering of `None`.
#[must_use]
pub fn build_query(api_key: &str, reading: &Reading) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("api_key", api_key.to_string())];
    if let Some(t) = reading.temperature {
        pairs.push(("field1", t.to_string()));
    }
    if let Some(h) = reading.humidity {
        pairs.push(("field2", h.to_string()));
    }
    if let Some(c) = reading.co2 {
        pairs.push(("field3", c.to_string()));
    }
    pairs
}

// ============================================
// Forwarder
// ============================================

/// HTTP client for the ThingSpeak ingestion endpoint.
pub struct Forwarder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Forwarder {
    /// Creates a forwarder against the production ThingSpeak API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_INGEST_BASE_URL)
    }

    /// Creates a forwarder against an explicit base URL (used by tests).
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Forwards one reading. No retry; the caller logs and waits for the
    /// next cycle.
    ///
    /// # Errors
    /// Returns [`CoreError::Transport`] or [`CoreError::Http`].
    pub async fn forward(&self, reading: &Reading) -> Result<()> {
        let url = format!("{}/update", self.base_url);
        let query = build_query(&self.api_key, reading);

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| CoreError::transport("ingest update", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::http("ingest update", status.as_u16(), body));
        }

        info!(
            temperature = ?reading.temperature,
            humidity = ?reading.humidity,
            co2 = ?reading.co2,
            "Reading forwarded to ThingSpeak"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::parse_status;

    #[test]
    fn test_query_omits_absent_fields() {
        let reading = Reading {
            temperature: Some(21.5),
            humidity: None,
            co2: Some(400.0),
        };
        let query = build_query("KEY", &reading);

        assert_eq!(
            query,
            vec![
                ("api_key", "KEY".to_string()),
                ("field1", "21.5".to_string()),
                ("field3", "400".to_string()),
            ]
        );
        assert!(!query.iter().any(|(k, _)| *k == "field2"));
    }

    #[test]
    fn test_query_zero_is_not_absent() {
        let reading = Reading {
            temperature: Some(0.0),
            humidity: None,
            co2: None,
        };
        let query = build_query("KEY", &reading);
        assert!(query.contains(&("field1", "0".to_string())));
    }

    #[test]
    fn test_query_for_empty_reading_is_key_only() {
        let reading = Reading {
            temperature: None,
            humidity: None,
            co2: None,
        };
        assert_eq!(build_query("KEY", &reading).len(), 1);
    }

    #[test]
    fn test_status_to_query_pipeline() {
        // End-to-end over the pure halves: sensor body in, query pairs out.
        let raw = r#"{
            "statusCode": 100,
            "body": {"temperature": 22.1, "humidity": 55, "CO2": 410}
        }"#;
        let reading = parse_status(raw).unwrap();
        let query = build_query("KEY", &reading);

        assert_eq!(
            query,
            vec![
                ("api_key", "KEY".to_string()),
                ("field1", "22.1".to_string()),
                ("field2", "55".to_string()),
                ("field3", "410".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_forward_transport_error() {
        let forwarder = Forwarder::with_base_url("KEY", "http://127.0.0.1:9");
        let reading = Reading {
            temperature: Some(21.0),
            humidity: Some(50.0),
            co2: Some(500.0),
        };
        let err = forwarder.forward(&reading).await.unwrap_err();
        assert!(matches!(err, CoreError::Transport { .. }));
    }
}
