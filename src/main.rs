//! srt-alert - SRT stream health monitor
//!
//! Watches an SRT publisher's bitrate and RTT and toggles a warning source in
//! OBS while the stream is degraded.

use clap::Parser;
use srt_alert::cli::args::{generate_completions, Cli, Commands};
use srt_alert::commands::{run_check, run_init, run_monitor, run_probe};
use srt_alert::error::{AppError, ConfigError, ObsError, SinkError};

fn main() {
    // Initialize logging; our own debug lines pass the filter but stay
    // hidden behind the global level until verbose output is requested
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,srt_alert=debug"),
    )
    .format_timestamp_secs()
    .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag, unless RUST_LOG decides
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
    }

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_monitor(args, config, cli.dry_run, cli.verbose),

        Commands::Check => run_check(config, cli.format, cli.dry_run),

        Commands::Probe(args) => run_probe(args, config, cli.format),

        Commands::Init(args) => run_init(args, cli.format),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::NoConfigFound(_)) => {
            eprintln!();
            eprintln!("Hint: Run 'srt-alert init' to write a default config,");
            eprintln!("      or pass one with --config.");
        }
        AppError::Config(e) => {
            if let Some(field) = e.field() {
                eprintln!();
                eprintln!("Hint: Fix '{}' in your config file or on the command line.", field);
            }
        }
        AppError::Obs(ObsError::AuthFailed)
        | AppError::Sink(SinkError::Obs(ObsError::AuthFailed)) => {
            eprintln!();
            eprintln!("Hint: Check obs.password against OBS Tools > WebSocket Server Settings.");
        }
        AppError::Source(_) => {
            eprintln!();
            eprintln!("Hint: Check that the SRT server is running and stats.url is correct.");
        }
        _ => {}
    }
}
