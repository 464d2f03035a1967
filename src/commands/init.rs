//! Init command implementation
//!
//! Writes a configuration file populated with the defaults.

use crate::cli::args::{InitArgs, OutputFormat};
use crate::cli::output::{print_output, Message};
use crate::config::{Config, ConfigFile};
use crate::error::{ConfigError, Result};

use std::path::Path;

/// Execute the init command
pub fn run_init(args: &InitArgs, format: OutputFormat) -> Result<()> {
    let path = args.path.clone().unwrap_or_else(ConfigFile::user_path);
    write_default(&path, args.force)?;

    let msg = Message {
        message: format!("Wrote default configuration to {}", path.display()),
        success: true,
    };
    print_output(&msg, format)?;

    Ok(())
}

fn write_default(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.display().to_string()).into());
    }

    ConfigFile::save(&Config::default(), path)?;
    log::debug!("Saved config to {}", path.display());
    Ok(())
}
