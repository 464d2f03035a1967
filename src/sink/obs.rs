//! OBS overlay sink
//!
//! Shows or hides the warning source through obs-websocket. Connects lazily
//! and reconnects with backoff after transport failures.

use super::AlertSink;
use crate::config::ObsConfig;
use crate::domain::Backoff;
use crate::error::{ObsError, SinkError};
use crate::obs::ObsClient;

use std::time::Instant;

/// Sink that toggles a scene item in OBS
pub struct ObsSink {
    config: ObsConfig,
    client: Option<ObsClient>,
    scene_item_id: Option<i64>,
    backoff: Backoff,
    was_connected: bool,
}

impl ObsSink {
    /// Create a sink; no connection is made until needed
    pub fn new(config: ObsConfig) -> Self {
        Self {
            config,
            client: None,
            scene_item_id: None,
            backoff: Backoff::new(),
            was_connected: false,
        }
    }

    /// Whether a websocket connection is currently open
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Connect now if not connected and the backoff allows it
    pub fn connect(&mut self) -> Result<(), SinkError> {
        self.ensure_connected(Instant::now())
    }

    /// Close the connection, if any
    pub fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            client.disconnect();
            log::debug!("OBS WebSocket connection closed");
        }
        self.scene_item_id = None;
    }

    fn ensure_connected(&mut self, now: Instant) -> Result<(), SinkError> {
        if self.client.is_some() {
            return Ok(());
        }
        if let Some(remaining) = self.backoff.remaining(now) {
            return Err(SinkError::Backoff(remaining));
        }

        match ObsClient::connect(&self.config.url(), &self.config.password) {
            Ok(client) => {
                log::info!("OBS WebSocket connection successful");
                self.client = Some(client);
                self.scene_item_id = None;
                self.backoff.reset();
                self.was_connected = true;
                Ok(())
            }
            Err(e) => {
                if self.was_connected {
                    log::error!("OBS WebSocket connection lost");
                    self.was_connected = false;
                }
                let delay = self.backoff.fail(now);
                log::error!(
                    "OBS WebSocket connection failed: {}. Retrying in {} seconds...",
                    e,
                    delay.as_secs()
                );
                Err(e.into())
            }
        }
    }

    fn apply(&mut self, visible: bool) -> Result<(), ObsError> {
        let client = self.client.as_mut().ok_or(ObsError::Closed)?;

        let id = match self.scene_item_id {
            Some(id) => id,
            None => {
                let id = client.scene_item_id(&self.config.scene, &self.config.source)?;
                log::debug!(
                    "Resolved '{}' in scene '{}' to item {}",
                    self.config.source,
                    self.config.scene,
                    id
                );
                self.scene_item_id = Some(id);
                id
            }
        };

        client.set_scene_item_enabled(&self.config.scene, id, visible)
    }
}

impl AlertSink for ObsSink {
    fn set_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        self.ensure_connected(Instant::now())?;

        match self.apply(visible) {
            Ok(()) => Ok(()),
            // OBS answered; the connection itself is fine
            Err(e @ (ObsError::RequestFailed { .. } | ObsError::SourceNotFound { .. })) => {
                self.scene_item_id = None;
                Err(e.into())
            }
            Err(e) => {
                self.client = None;
                self.scene_item_id = None;
                Err(e.into())
            }
        }
    }

    fn name(&self) -> &str {
        "obs"
    }
}

impl Drop for ObsSink {
    fn drop(&mut self) {
        self.disconnect();
    }
}
