//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod init;
pub mod probe;
pub mod run;

pub use check::run_check;
pub use init::run_init;
pub use probe::run_probe;
pub use run::run_monitor;

use crate::config::{Config, ConfigBuilder};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Load configuration from `path` or the default locations
///
/// Returns the merged configuration and the file it came from.
pub(crate) fn load_config(
    path: Option<&str>,
    dry_run: bool,
    verbose: bool,
) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let builder = ConfigBuilder::new()
        .with_file(path)?
        .with_dry_run(dry_run.then_some(true))
        .with_verbose(verbose.then_some(true));
    let source = builder.source().cloned();
    let config = builder.build();
    apply_verbose(&config);
    Ok((config, source))
}

/// Raise logging to debug when the config asks for verbose output
///
/// Only widens the global level. The logger's own filter still applies, so
/// an explicit `RUST_LOG` keeps the final say.
pub(crate) fn apply_verbose(config: &Config) {
    if config.general.verbose && log::max_level() < log::LevelFilter::Debug {
        log::set_max_level(log::LevelFilter::Debug);
        log::debug!("Verbose logging enabled by configuration");
    }
}
