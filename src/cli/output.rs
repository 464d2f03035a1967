//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::domain::{Degradation, Sample};
use crate::engine::EngineConfig;
use crate::source::PublisherStats;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// Effective configuration, as reported by `check`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub source: Option<String>,
    pub stats_url: String,
    pub publisher: String,
    pub obs_url: String,
    pub obs_auth: bool,
    pub scene: String,
    pub overlay_source: String,
    pub poll_interval_seconds: f64,
    pub dry_run: bool,
    pub engine: EngineConfig,
}

impl ConfigSummary {
    /// Summarize a validated configuration
    pub fn new(config: &Config, engine: EngineConfig, source: Option<&Path>) -> Self {
        Self {
            source: source.map(|p| p.display().to_string()),
            stats_url: config.stats.url.clone(),
            publisher: config.stats.publisher.clone(),
            obs_url: config.obs.url(),
            obs_auth: !config.obs.password.is_empty(),
            scene: config.obs.scene.clone(),
            overlay_source: config.obs.source.clone(),
            poll_interval_seconds: config.general.poll_interval_seconds,
            dry_run: config.general.dry_run,
            engine,
        }
    }
}

impl TableDisplay for ConfigSummary {
    fn to_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Config File:       {}\n",
            self.source.as_deref().unwrap_or("(defaults)")
        ));
        output.push_str(&format!("Stats URL:         {}\n", self.stats_url));
        output.push_str(&format!("Publisher:         {}\n", self.publisher));
        output.push_str(&format!(
            "OBS:               {} ({})\n",
            self.obs_url,
            if self.obs_auth { "password" } else { "no auth" }
        ));
        output.push_str(&format!(
            "Overlay:           {} / {}\n",
            self.scene, self.overlay_source
        ));
        output.push_str(&format!(
            "Poll Interval:     {} s\n",
            self.poll_interval_seconds
        ));
        output.push_str(&format!(
            "Bitrate Threshold: {} kbps\n",
            self.engine.bitrate_threshold_kbps()
        ));
        output.push_str(&format!(
            "RTT Threshold:     {} ms\n",
            self.engine.rtt_threshold_ms()
        ));
        output.push_str(&format!(
            "Warmup:            {} s\n",
            self.engine.warmup().as_secs_f64()
        ));
        output.push_str(&format!(
            "Display:           {} s\n",
            self.engine.display().as_secs_f64()
        ));
        output.push_str(&format!(
            "Cooldown:          {} s",
            self.engine.cooldown().as_secs_f64()
        ));
        if self.dry_run {
            output.push_str("\nDry Run:           yes");
        }
        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{} -> {} [{}kbps/{}ms, {}s/{}s]",
            self.publisher,
            self.overlay_source,
            self.engine.bitrate_threshold_kbps(),
            self.engine.rtt_threshold_ms(),
            self.engine.display().as_secs_f64(),
            self.engine.cooldown().as_secs_f64()
        )
    }
}

/// One reading from the stats server, as reported by `probe`
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub publisher: String,
    pub connected: bool,
    pub bitrate_kbps: Option<f64>,
    pub rtt_ms: Option<f64>,
    pub degraded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<ObsProbe>,
}

/// OBS connection check, as reported by `probe --obs`
#[derive(Debug, Clone, Serialize)]
pub struct ObsProbe {
    pub url: String,
    pub version: Option<String>,
    pub scene: String,
    pub source: String,
    pub scene_item_id: i64,
}

impl ProbeResult {
    /// Build a probe result, judging the reading against the engine thresholds
    pub fn new(
        url: &str,
        publisher: &str,
        stats: Option<PublisherStats>,
        engine: &EngineConfig,
    ) -> Self {
        Self {
            url: url.to_string(),
            publisher: publisher.to_string(),
            connected: stats.is_some(),
            bitrate_kbps: stats.map(|s| s.bitrate_kbps),
            rtt_ms: stats.map(|s| s.rtt_ms),
            degraded: stats.map(|s| {
                let sample = Sample::connected(s.bitrate_kbps, s.rtt_ms, Instant::now());
                Degradation::detect(
                    &sample,
                    engine.bitrate_threshold_kbps(),
                    engine.rtt_threshold_ms(),
                )
                .is_some()
            }),
            obs: None,
        }
    }

    /// Builder: attach the OBS check
    pub fn with_obs(mut self, obs: ObsProbe) -> Self {
        self.obs = Some(obs);
        self
    }
}

impl TableDisplay for ProbeResult {
    fn to_table(&self) -> String {
        let mut output = format!("Stats URL: {}\nPublisher: {}\n", self.url, self.publisher);
        match (self.bitrate_kbps, self.rtt_ms) {
            (Some(bitrate), Some(rtt)) => {
                output.push_str(&format!("Bitrate:   {:.0} kbps\n", bitrate));
                output.push_str(&format!("RTT:       {:.0} ms\n", rtt));
                let status = if self.degraded == Some(true) {
                    "DEGRADED"
                } else {
                    "OK"
                };
                output.push_str(&format!("Status:    {}", status));
            }
            _ => output.push_str("Status:    not connected"),
        }
        if let Some(obs) = &self.obs {
            output.push_str(&format!(
                "\nOBS:       {} (obs-websocket {})",
                obs.url,
                obs.version.as_deref().unwrap_or("unknown")
            ));
            output.push_str(&format!(
                "\nOverlay:   {} / {} (item {})",
                obs.scene, obs.source, obs.scene_item_id
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        match (self.bitrate_kbps, self.rtt_ms) {
            (Some(bitrate), Some(rtt)) => format!(
                "{}: {:.0}kbps {:.0}ms{}",
                self.publisher,
                bitrate,
                rtt,
                if self.degraded == Some(true) {
                    " DEGRADED"
                } else {
                    ""
                }
            ),
            _ => format!("{}: offline", self.publisher),
        }
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}
