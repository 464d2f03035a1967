//! Configuration system
//!
//! Handles TOML (and legacy JSON) config file parsing and CLI argument merging.

pub mod builder;
pub mod file;
pub mod legacy;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;
pub use legacy::LegacyConfig;

use crate::engine::config::to_duration;
use crate::engine::{EngineConfig, POLL_INTERVAL};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Stats feed settings
    pub stats: StatsConfig,
    /// OBS websocket settings
    pub obs: ObsConfig,
    /// Alert thresholds and timers
    pub alert: AlertConfig,
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Dry run mode
    pub dry_run: bool,
    /// Sampling interval in seconds
    pub poll_interval_seconds: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
            poll_interval_seconds: POLL_INTERVAL.as_secs_f64(),
        }
    }
}

/// Stats feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// URL of the SRT server's JSON stats endpoint
    pub url: String,
    /// Publisher key inside the `publishers` map
    pub publisher: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8181/stats".to_string(),
            publisher: "live/feed1".to_string(),
            timeout_ms: 1000,
        }
    }
}

impl StatsConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// OBS websocket configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsConfig {
    /// OBS websocket host
    pub host: String,
    /// OBS websocket port
    pub port: u16,
    /// OBS websocket password (empty when authentication is disabled)
    pub password: String,
    /// Scene containing the warning overlay
    pub scene: String,
    /// Name of the warning overlay source
    pub source: String,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4455,
            password: String::new(),
            scene: "Scene".to_string(),
            source: "LowBitrateWarning".to_string(),
        }
    }
}

impl ObsConfig {
    /// Websocket URL for this host and port
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Alert thresholds and timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Bitrate below which the stream is degraded (kbps)
    pub bitrate_threshold_kbps: f64,
    /// RTT at or above which the stream is degraded (ms)
    pub rtt_threshold_ms: f64,
    /// How long the overlay stays visible (seconds)
    pub display_seconds: f64,
    /// Minimum gap between the end of one alert and the next (seconds)
    pub cooldown_seconds: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bitrate_threshold_kbps: 2000.0,
            rtt_threshold_ms: 700.0,
            display_seconds: 30.0,
            cooldown_seconds: 600.0,
        }
    }
}

impl AlertConfig {
    /// Convert to a validated engine configuration
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        EngineConfig::new(
            self.bitrate_threshold_kbps,
            self.rtt_threshold_ms,
            self.display_seconds,
            self.cooldown_seconds,
        )
    }
}

impl Config {
    /// Validate every section and build the engine configuration
    ///
    /// Monitoring must not start unless this succeeds.
    pub fn validate(&self) -> Result<EngineConfig, ConfigError> {
        non_empty("stats.url", &self.stats.url)?;
        non_empty("stats.publisher", &self.stats.publisher)?;
        non_empty("obs.host", &self.obs.host)?;
        non_empty("obs.scene", &self.obs.scene)?;
        non_empty("obs.source", &self.obs.source)?;

        if self.obs.port == 0 {
            return Err(ConfigError::invalid("obs.port", "must be greater than 0"));
        }
        if self.stats.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "stats.timeout_ms",
                "must be greater than 0",
            ));
        }
        self.poll_interval()?;

        self.alert.to_engine_config()
    }

    /// Sampling interval
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        let secs = self.general.poll_interval_seconds;
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigError::invalid(
                "general.poll_interval_seconds",
                format!("must be greater than 0 (got {})", secs),
            ));
        }
        to_duration("general.poll_interval_seconds", secs)
    }
}

fn non_empty(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::invalid(key, "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.poll_interval_seconds, 2.0);
        assert_eq!(config.obs.port, 4455);
        assert_eq!(config.stats.timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_obs_url() {
        let config = ObsConfig::default();
        assert_eq!(config.url(), "ws://localhost:4455");
    }

    #[test]
    fn test_validate_rejects_empty_source() {
        let mut config = Config::default();
        config.obs.source = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("obs.source"));
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        let mut config = Config::default();
        config.alert.display_seconds = 30.0;
        config.alert.cooldown_seconds = 20.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("cooldown_seconds"));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.general.poll_interval_seconds = 0.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("general.poll_interval_seconds"));
    }

    #[test]
    fn test_validate_rejects_huge_poll_interval() {
        let mut config = Config::default();
        config.general.poll_interval_seconds = 1e19;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("general.poll_interval_seconds"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [alert]
            bitrate_threshold_kbps = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.alert.bitrate_threshold_kbps, 1500.0);
        assert_eq!(config.alert.cooldown_seconds, 600.0);
        assert_eq!(config.obs.host, "localhost");
    }
}
