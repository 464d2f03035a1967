//! Configuration file loading
//!
//! Handles loading configuration from TOML files, with a fallback to the
//! legacy JSON format for `.json` paths.

use crate::config::{Config, LegacyConfig};
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        if Self::is_legacy(path) {
            log::debug!("Reading legacy JSON config {}", path.display());
            return Ok(LegacyConfig::from_json(&content)?.into());
        }

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load_default() -> Result<(PathBuf, Config), ConfigError> {
        let paths = Self::default_paths();
        for path in &paths {
            if path.exists() {
                let config = Self::load(path)?;
                log::info!("Loaded config from {}", path.display());
                return Ok((path.clone(), config));
            }
        }

        let searched = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ConfigError::NoConfigFound(searched))
    }

    /// Write configuration as TOML
    pub fn save<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::ParseError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        std::fs::write(path, contents).map_err(|e| {
            ConfigError::ParseError(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Get default configuration file paths, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System-wide config
        paths.push(PathBuf::from("/etc/srt-alert/config.toml"));

        // User config
        paths.push(Self::user_path());

        // Current directory
        paths.push(PathBuf::from("srt-alert.toml"));
        paths.push(PathBuf::from("abc_config.json"));

        paths
    }

    /// Per-user config path
    pub fn user_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("srt-alert").join("config.toml")
        } else {
            PathBuf::from("srt-alert.toml")
        }
    }

    fn is_legacy(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}
