// ============================================
// File: crates/airrelay-agent/src/config.rs
// ============================================
//! # Agent Configuration
//!
//! ## Creation Reason
//! Supplies credentials and schedule settings to the agent, from a TOML
//! file with environment-variable overrides. No ambient globals: the
//! loaded struct is passed into each component's constructor.
//!
//! ## Configuration Sections
//! - `switchbot`: API token, signing secret, device id
//! - `thingspeak`: channel write API key
//! - `scheduler`: polling interval in minutes
//! - `logging`: log level
//!
//! ## Example Configuration
//! ```toml
//! [switchbot]
//! token = "xxxx"
//! secret = "yyyy"
//! device_id = "ABCDEF123456"
//!
//! [thingspeak]
//! api_key = "ZZZZZZZZ"
//!
//! [scheduler]
//! interval_minutes = 10
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ## Environment Overrides
//! `SWITCHBOT_TOKEN`, `SWITCHBOT_SECRET`, `SWITCHBOT_DEVICE_ID`, and
//! `THINGSPEAK_API_KEY` take precedence over file values when set, so
//! the agent runs with no config file at all in containerized or
//! serverless deployments.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Credentials are held in memory for the process lifetime and never
//!   written anywhere by this crate
//! - Config changes require an agent restart
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use airrelay_core::sensor::Credentials;

use crate::error::{AgentError, Result};

// ============================================
// AgentConfig
// ============================================

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// SwitchBot API credentials.
    #[serde(default)]
    pub switchbot: SwitchBotConfig,

    /// ThingSpeak ingestion settings.
    #[serde(default)]
    pub thingspeak: ThingSpeakConfig,

    /// Polling schedule.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AgentConfig {
    /// Loads configuration from a TOML file and applies environment
    /// overrides.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AgentError::config_load(&path_str, e.to_string()))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| AgentError::config_load(&path_str, e.to_string()))?;

        config.apply_env();
        Ok(config)
    }

    /// Parses configuration from a TOML string (useful for testing).
    /// Does not apply environment overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AgentError::config_load("<string>", e.to_string()))
    }

    /// Builds configuration purely from defaults plus environment
    /// variables, for deployments without a config file.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlays environment variables onto the current values.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("SWITCHBOT_TOKEN") {
            self.switchbot.token = v;
        }
        if let Ok(v) = std::env::var("SWITCHBOT_SECRET") {
            self.switchbot.secret = v;
        }
        if let Ok(v) = std::env::var("SWITCHBOT_DEVICE_ID") {
            self.switchbot.device_id = v;
        }
        if let Ok(v) = std::env::var("THINGSPEAK_API_KEY") {
            self.thingspeak.api_key = v;
        }
    }

    /// Validates the full merged configuration (polling + forwarding).
    ///
    /// # Errors
    /// Returns `ConfigMissing`/`ConfigInvalid` for absent credentials or
    /// a zero interval. Fatal at startup.
    pub fn validate(&self) -> Result<()> {
        self.validate_switchbot()?;
        if self.thingspeak.api_key.is_empty() {
            return Err(AgentError::config_missing("thingspeak.api_key"));
        }
        if self.scheduler.interval_minutes == 0 {
            return Err(AgentError::config_invalid(
                "scheduler.interval_minutes",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Validates only the SwitchBot credentials.
    ///
    /// Commands that never forward (device discovery) need the sensor
    /// side alone, so an unset ThingSpeak key must not block them.
    ///
    /// # Errors
    /// Returns `ConfigMissing` for an absent credential.
    pub fn validate_switchbot(&self) -> Result<()> {
        if self.switchbot.token.is_empty() {
            return Err(AgentError::config_missing("switchbot.token"));
        }
        if self.switchbot.secret.is_empty() {
            return Err(AgentError::config_missing("switchbot.secret"));
        }
        if self.switchbot.device_id.is_empty() {
            return Err(AgentError::config_missing("switchbot.device_id"));
        }
        Ok(())
    }

    /// Returns the SwitchBot credentials for the core client.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            token: self.switchbot.token.clone(),
            secret: self.switchbot.secret.clone(),
            device_id: self.switchbot.device_id.clone(),
        }
    }
}

// ============================================
// Sections
// ============================================

/// SwitchBot API configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchBotConfig {
    /// Public API token (also the Bearer token).
    #[serde(default)]
    pub token: String,

    /// Shared signing secret.
    #[serde(default)]
    pub secret: String,

    /// Device identifier to poll.
    #[serde(default)]
    pub device_id: String,
}

/// ThingSpeak configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThingSpeakConfig {
    /// Channel write API key.
    #[serde(default)]
    pub api_key: String,
}

/// Scheduler configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Polling interval in minutes.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

fn default_interval_minutes() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_toml() -> &'static str {
        r#"
            [switchbot]
            token = "tok"
            secret = "sec"
            device_id = "DEV123"

            [thingspeak]
            api_key = "KEY"

            [scheduler]
            interval_minutes = 5

            [logging]
            level = "debug"
        "#
    }

    #[test]
    fn test_full_config_parses_and_validates() {
        let config = AgentConfig::from_toml(full_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.switchbot.device_id, "DEV123");
        assert_eq!(config.scheduler.interval_minutes, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = AgentConfig::from_toml(
            r#"
            [switchbot]
            token = "tok"
            secret = "sec"
            device_id = "DEV123"

            [thingspeak]
            api_key = "KEY"
        "#,
        )
        .unwrap();

        assert_eq!(config.scheduler.interval_minutes, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = AgentConfig::from_toml(
            r#"
            [switchbot]
            secret = "sec"
            device_id = "DEV123"

            [thingspeak]
            api_key = "KEY"
        "#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(AgentError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn test_switchbot_only_validation_ignores_ingest_key() {
        let config = AgentConfig::from_toml(
            r#"
            [switchbot]
            token = "tok"
            secret = "sec"
            device_id = "DEV123"
        "#,
        )
        .unwrap();

        // Device discovery needs no ThingSpeak key...
        assert!(config.validate_switchbot().is_ok());
        // ...but the full agent still does.
        assert!(matches!(
            config.validate(),
            Err(AgentError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = AgentConfig::from_toml(full_toml()).unwrap();
        config.scheduler.interval_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(AgentError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        // Serialized access: env vars are process-global.
        let mut config = AgentConfig::from_toml(full_toml()).unwrap();
        std::env::set_var("SWITCHBOT_TOKEN", "env-token");
        config.apply_env();
        std::env::remove_var("SWITCHBOT_TOKEN");

        assert_eq!(config.switchbot.token, "env-token");
        assert_eq!(config.switchbot.secret, "sec");
    }

    #[test]
    fn test_credentials_mapping() {
        let config = AgentConfig::from_toml(full_toml()).unwrap();
        let creds = config.credentials();
        assert_eq!(creds.token, "tok");
        assert_eq!(creds.secret, "sec");
        assert_eq!(creds.device_id, "DEV123");
    }
}
