//! HTTP stats feed source
//!
//! Polls the SRT server's stats endpoint with a blocking client and turns
//! every failure into a disconnected sample.

use super::stats::{parse_publisher, PublisherStats};
use super::SampleSource;
use crate::config::StatsConfig;
use crate::domain::{Backoff, Sample};
use crate::error::SourceError;

use reqwest::blocking::Client;
use std::time::{Duration, Instant};

/// Stats source backed by the SRT server's JSON endpoint
pub struct HttpStatsSource {
    client: Client,
    url: String,
    publisher: String,
    backoff: Backoff,
    server_reachable: bool,
    stream_live: Option<bool>,
}

impl HttpStatsSource {
    /// Create a source for the configured endpoint and publisher
    pub fn new(config: &StatsConfig) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            publisher: config.publisher.clone(),
            backoff: Backoff::new(),
            server_reachable: false,
            stream_live: None,
        })
    }

    /// Fetch the current stats for the configured publisher
    ///
    /// `Ok(None)` means the server answered but no stream is being received.
    pub fn fetch(&self) -> Result<Option<PublisherStats>, SourceError> {
        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_publisher(&body, &self.publisher)
    }

    /// Endpoint being polled
    pub fn url(&self) -> &str {
        &self.url
    }

    fn on_success(&mut self, stats: Option<PublisherStats>, now: Instant) -> Sample {
        if !self.server_reachable {
            log::info!("SRT server connection successful");
            self.server_reachable = true;
        }
        self.backoff.reset();

        match stats {
            Some(stats) => {
                if self.stream_live != Some(true) {
                    log::info!(
                        "Stream detected on '{}' ({} kbps)",
                        self.publisher,
                        stats.bitrate_kbps
                    );
                }
                self.stream_live = Some(true);
                Sample::connected(stats.bitrate_kbps, stats.rtt_ms, now)
            }
            None => {
                if self.stream_live != Some(false) {
                    log::info!("No stream detected. Waiting for stream to start...");
                }
                self.stream_live = Some(false);
                Sample::disconnected(now)
            }
        }
    }

    fn on_failure(&mut self, err: SourceError, now: Instant) -> Sample {
        let delay = self.backoff.fail(now);
        log::error!(
            "SRT server connection failed: {}. Retrying in {} seconds...",
            err,
            delay.as_secs()
        );
        self.server_reachable = false;
        self.stream_live = None;
        Sample::disconnected(now)
    }
}

impl SampleSource for HttpStatsSource {
    fn poll(&mut self) -> Sample {
        let now = Instant::now();
        match self.fetch() {
            Ok(stats) => self.on_success(stats, now),
            Err(err) => self.on_failure(err, now),
        }
    }

    fn retry_delay(&self) -> Option<Duration> {
        self.backoff.current_delay()
    }
}
