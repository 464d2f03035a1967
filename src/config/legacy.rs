//! Legacy JSON configuration
//!
//! Reads the flat, upper-case `abc_config.json` format used by earlier
//! releases of the monitor and maps it onto [`Config`].

use super::{AlertConfig, Config, GeneralConfig, ObsConfig, StatsConfig};
use crate::error::ConfigError;
use serde::Deserialize;

/// Fields that must be present in a legacy file
pub const REQUIRED_FIELDS: [&str; 11] = [
    "STATS_URL",
    "PUBLISHER",
    "OBS_HOST",
    "OBS_PORT",
    "OBS_PASSWORD",
    "SOURCE_NAME",
    "SCENE_NAME",
    "BITRATE_THRESHOLD",
    "RTT_THRESHOLD",
    "COOLDOWN_SECONDS",
    "SOURCE_DISPLAY_TIME",
];

/// Flat legacy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LegacyConfig {
    pub stats_url: String,
    pub publisher: String,
    pub obs_host: String,
    pub obs_port: u16,
    pub obs_password: String,
    pub source_name: String,
    pub scene_name: String,
    pub bitrate_threshold: f64,
    pub rtt_threshold: f64,
    pub cooldown_seconds: f64,
    pub source_display_time: f64,
}

impl LegacyConfig {
    /// Parse a legacy JSON document, reporting the first missing field by name
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(contents)?;
        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::ParseError("expected a JSON object".to_string()))?;

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(ConfigError::MissingField(missing.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }
}

impl From<LegacyConfig> for Config {
    fn from(legacy: LegacyConfig) -> Self {
        Self {
            general: GeneralConfig::default(),
            stats: StatsConfig {
                url: legacy.stats_url,
                publisher: legacy.publisher,
                ..StatsConfig::default()
            },
            obs: ObsConfig {
                host: legacy.obs_host,
                port: legacy.obs_port,
                password: legacy.obs_password,
                scene: legacy.scene_name,
                source: legacy.source_name,
            },
            alert: AlertConfig {
                bitrate_threshold_kbps: legacy.bitrate_threshold,
                rtt_threshold_ms: legacy.rtt_threshold,
                display_seconds: legacy.source_display_time,
                cooldown_seconds: legacy.cooldown_seconds,
            },
        }
    }
}
