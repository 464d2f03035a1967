//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// SRT stream health monitor
///
/// Watches an SRT server's bitrate and RTT and shows a warning source in OBS
/// when the link degrades.
#[derive(Parser, Debug)]
#[command(name = "srt-alert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file (.toml, or legacy .json)
    #[arg(short, long, global = true, env = "SRT_ALERT_CONFIG")]
    pub config: Option<String>,

    /// Dry run mode - log overlay changes instead of sending them to OBS
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start monitoring the stream
    Run(RunArgs),

    /// Validate the configuration and show the effective settings
    Check,

    /// Fetch one sample from the stats server
    Probe(ProbeArgs),

    /// Write a default configuration file
    Init(InitArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Run once and exit (single-use mode)
    #[arg(long)]
    pub single_use: bool,

    /// Poll interval in seconds
    #[arg(short, long)]
    pub interval: Option<f64>,

    /// Bitrate threshold in kbps
    #[arg(long, value_name = "KBPS")]
    pub bitrate_threshold: Option<f64>,

    /// RTT threshold in milliseconds
    #[arg(long, value_name = "MS")]
    pub rtt_threshold: Option<f64>,

    /// How long the warning stays visible, in seconds
    #[arg(long, value_name = "SECS")]
    pub display_seconds: Option<f64>,

    /// Minimum gap between alerts, in seconds
    #[arg(long, value_name = "SECS")]
    pub cooldown_seconds: Option<f64>,
}

/// Arguments for the probe command
#[derive(Parser, Debug, Default)]
pub struct ProbeArgs {
    /// Also connect to OBS and resolve the overlay source
    #[arg(long)]
    pub obs: bool,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the file (defaults to the per-user config path)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
