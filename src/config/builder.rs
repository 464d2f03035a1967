//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
    source: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source: None,
        }
    }

    /// Load configuration from a file, or the default locations when `path` is `None`
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let (source, config) = match path {
            Some(path) => (PathBuf::from(path), ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        self.config = config;
        self.source = Some(source);
        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI dry-run flag
    pub fn with_dry_run(mut self, dry_run: Option<bool>) -> Self {
        if let Some(d) = dry_run {
            self.config.general.dry_run = d;
        }
        self
    }

    /// Override with CLI poll interval
    pub fn with_poll_interval(mut self, seconds: Option<f64>) -> Self {
        if let Some(s) = seconds {
            self.config.general.poll_interval_seconds = s;
        }
        self
    }

    /// Override with CLI bitrate threshold
    pub fn with_bitrate_threshold(mut self, kbps: Option<f64>) -> Self {
        if let Some(k) = kbps {
            self.config.alert.bitrate_threshold_kbps = k;
        }
        self
    }

    /// Override with CLI RTT threshold
    pub fn with_rtt_threshold(mut self, ms: Option<f64>) -> Self {
        if let Some(m) = ms {
            self.config.alert.rtt_threshold_ms = m;
        }
        self
    }

    /// Override with CLI display duration
    pub fn with_display_seconds(mut self, seconds: Option<f64>) -> Self {
        if let Some(s) = seconds {
            self.config.alert.display_seconds = s;
        }
        self
    }

    /// Override with CLI cooldown duration
    pub fn with_cooldown_seconds(mut self, seconds: Option<f64>) -> Self {
        if let Some(s) = seconds {
            self.config.alert.cooldown_seconds = s;
        }
        self
    }

    /// File the configuration was loaded from, if any
    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
