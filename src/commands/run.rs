//! Run command implementation
//!
//! Runs the monitoring loop until interrupted.

use crate::cli::args::RunArgs;
use crate::config::{Config, ConfigBuilder};
use crate::engine::AlertEngine;
use crate::error::{AppError, Result};
use crate::services::{Monitor, MonitorConfig};
use crate::sink::{AlertSink, DryRunSink, ObsSink};
use crate::source::HttpStatsSource;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Execute the run command
pub fn run_monitor(
    args: &RunArgs,
    config_path: Option<&str>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let config = merge_config(args, config_path, dry_run, verbose)?;

    // Nothing starts until every value checks out
    let engine_config = config.validate()?;
    let interval = config.poll_interval()?;

    log::info!("Starting stream monitor");
    log::info!("  Stats: {} ({})", config.stats.url, config.stats.publisher);
    log::info!(
        "  Overlay: {} / {} on {}",
        config.obs.scene,
        config.obs.source,
        config.obs.url()
    );
    log::info!(
        "  Thresholds: {} kbps, {} ms",
        engine_config.bitrate_threshold_kbps(),
        engine_config.rtt_threshold_ms()
    );
    log::info!(
        "  Display: {:?}, cooldown: {:?}",
        engine_config.display(),
        engine_config.cooldown()
    );

    let source = HttpStatsSource::new(&config.stats)?;
    let sink = build_sink(&config);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Signal(e.to_string()))?;

    let mut monitor = Monitor::new(
        MonitorConfig {
            interval,
            single_use: args.single_use,
            overlay: config.obs.source.clone(),
        },
        AlertEngine::new(engine_config),
        source,
        sink,
    );
    monitor.run(&running);

    log::info!("Stream monitor stopped");
    Ok(())
}

fn merge_config(
    args: &RunArgs,
    config_path: Option<&str>,
    dry_run: bool,
    verbose: bool,
) -> Result<Config> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_dry_run(dry_run.then_some(true))
        .with_verbose(verbose.then_some(true))
        .with_poll_interval(args.interval)
        .with_bitrate_threshold(args.bitrate_threshold)
        .with_rtt_threshold(args.rtt_threshold)
        .with_display_seconds(args.display_seconds)
        .with_cooldown_seconds(args.cooldown_seconds)
        .build();
    super::apply_verbose(&config);
    Ok(config)
}

fn build_sink(config: &Config) -> Box<dyn AlertSink> {
    if config.general.dry_run {
        Box::new(DryRunSink::new(config.obs.source.clone()))
    } else {
        Box::new(ObsSink::new(config.obs.clone()))
    }
}
