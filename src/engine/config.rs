//! Validated engine configuration
//!
//! All timing relationships are checked once here. An `EngineConfig` that
//! exists is always usable, so the engine itself never fails.

use crate::error::ConfigError;
use serde::Serialize;
use std::time::Duration;

/// Discard window after every fresh connection
pub const WARMUP: Duration = Duration::from_secs(15);

/// Default sampling cadence
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Longest accepted display, cooldown or poll interval
pub const MAX_TIMER: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Thresholds and timers for the alert state machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    bitrate_threshold_kbps: f64,
    rtt_threshold_ms: f64,
    #[serde(with = "secs")]
    warmup: Duration,
    #[serde(with = "secs")]
    display: Duration,
    #[serde(with = "secs")]
    cooldown: Duration,
}

impl EngineConfig {
    /// Validate and build a configuration
    ///
    /// Fails with [`ConfigError::InvalidValue`] naming the first offending
    /// field when a threshold is not positive, `display_seconds <= 1`,
    /// `cooldown_seconds <= display_seconds`, or a timer exceeds [`MAX_TIMER`].
    pub fn new(
        bitrate_threshold_kbps: f64,
        rtt_threshold_ms: f64,
        display_seconds: f64,
        cooldown_seconds: f64,
    ) -> Result<Self, ConfigError> {
        positive("bitrate_threshold_kbps", bitrate_threshold_kbps)?;
        positive("rtt_threshold_ms", rtt_threshold_ms)?;

        if !display_seconds.is_finite() || display_seconds <= 1.0 {
            return Err(ConfigError::invalid(
                "display_seconds",
                format!("must be greater than 1 (got {})", display_seconds),
            ));
        }
        if !cooldown_seconds.is_finite() || cooldown_seconds <= display_seconds {
            return Err(ConfigError::invalid(
                "cooldown_seconds",
                format!(
                    "must be greater than display_seconds ({}), got {}",
                    display_seconds, cooldown_seconds
                ),
            ));
        }

        Ok(Self {
            bitrate_threshold_kbps,
            rtt_threshold_ms,
            warmup: WARMUP,
            display: to_duration("display_seconds", display_seconds)?,
            cooldown: to_duration("cooldown_seconds", cooldown_seconds)?,
        })
    }

    /// Bitrate below which the link is degraded
    #[inline]
    pub fn bitrate_threshold_kbps(&self) -> f64 {
        self.bitrate_threshold_kbps
    }

    /// RTT at or above which the link is degraded
    #[inline]
    pub fn rtt_threshold_ms(&self) -> f64 {
        self.rtt_threshold_ms
    }

    /// Warmup window after a fresh connection
    #[inline]
    pub fn warmup(&self) -> Duration {
        self.warmup
    }

    /// How long a triggered alert stays visible
    #[inline]
    pub fn display(&self) -> Duration {
        self.display
    }

    /// Quiet period after an alert ends
    #[inline]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            key,
            format!("must be greater than 0 (got {})", value),
        ))
    }
}

/// Convert seconds to a `Duration` no longer than [`MAX_TIMER`]
pub(crate) fn to_duration(key: &str, seconds: f64) -> Result<Duration, ConfigError> {
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|e| ConfigError::invalid(key, format!("not a valid duration: {}", e)))?;
    if duration > MAX_TIMER {
        return Err(ConfigError::invalid(
            key,
            format!(
                "must be at most {} seconds (got {})",
                MAX_TIMER.as_secs(),
                seconds
            ),
        ));
    }
    Ok(duration)
}

mod secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
