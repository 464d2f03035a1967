//! Alert sinks
//!
//! A sink applies the visibility decision to the display surface. Calls
//! with an unchanged value must be harmless.

pub mod obs;

pub use obs::ObsSink;

use crate::error::SinkError;

/// Display surface for the warning overlay
pub trait AlertSink {
    /// Show or hide the overlay
    fn set_visible(&mut self, visible: bool) -> Result<(), SinkError>;

    /// Sink name for identification
    fn name(&self) -> &str;
}

impl<K: AlertSink + ?Sized> AlertSink for Box<K> {
    fn set_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        (**self).set_visible(visible)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Sink that only logs what it would do
pub struct DryRunSink {
    source: String,
    visible: Option<bool>,
}

impl DryRunSink {
    /// Create a dry-run sink for the named overlay source
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            visible: None,
        }
    }

    /// Last value applied
    pub fn visible(&self) -> Option<bool> {
        self.visible
    }
}

impl AlertSink for DryRunSink {
    fn set_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        if self.visible != Some(visible) {
            log::info!(
                "[DRY RUN] Would {} {}",
                if visible { "show" } else { "hide" },
                self.source
            );
        }
        self.visible = Some(visible);
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
