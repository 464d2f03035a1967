//! Check command implementation
//!
//! Validates the configuration without touching the network.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, ConfigSummary};
use crate::error::Result;

/// Execute the check command
pub fn run_check(config_path: Option<&str>, format: OutputFormat, dry_run: bool) -> Result<()> {
    let (config, source) = super::load_config(config_path, dry_run, false)?;
    let engine = config.validate()?;

    let summary = ConfigSummary::new(&config, engine, source.as_deref());
    print_output(&summary, format)?;

    Ok(())
}
