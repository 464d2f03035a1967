//! Probe command implementation
//!
//! Fetches the stats document once and reports the publisher's reading.
//! With `--obs`, also checks that the overlay source can be found in OBS.

use crate::cli::args::{OutputFormat, ProbeArgs};
use crate::cli::output::{print_output, ObsProbe, ProbeResult};
use crate::config::ObsConfig;
use crate::error::{ObsError, Result};
use crate::obs::ObsClient;
use crate::source::HttpStatsSource;

/// Execute the probe command
pub fn run_probe(args: &ProbeArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let (config, _) = super::load_config(config_path, false, false)?;
    let engine = config.validate()?;

    let source = HttpStatsSource::new(&config.stats)?;
    let stats = source.fetch()?;

    let mut result = ProbeResult::new(source.url(), &config.stats.publisher, stats, &engine);
    if args.obs {
        result = result.with_obs(probe_obs(&config.obs)?);
    }
    print_output(&result, format)?;

    Ok(())
}

fn probe_obs(config: &ObsConfig) -> std::result::Result<ObsProbe, ObsError> {
    let url = config.url();
    let mut client = ObsClient::connect(&url, &config.password)?;
    let version = client.version().map(str::to_string);
    let lookup = client.scene_item_id(&config.scene, &config.source);
    client.disconnect();

    Ok(ObsProbe {
        url,
        version,
        scene: config.scene.clone(),
        source: config.source.clone(),
        scene_item_id: lookup?,
    })
}
