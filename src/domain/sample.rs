//! Link health samples
//!
//! A sample is one reading of the stats feed. Disconnection is a sample
//! value, not an error.

use std::fmt;
use std::time::Instant;

/// One reading of the stream's link health
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Incoming bitrate in kbps (meaningless when disconnected)
    pub bitrate_kbps: f64,
    /// Round-trip time in milliseconds (meaningless when disconnected)
    pub rtt_ms: f64,
    /// Whether a publisher is currently streaming
    pub connected: bool,
    /// When the reading was taken
    pub timestamp: Instant,
}

impl Sample {
    /// Reading from a live publisher
    pub fn connected(bitrate_kbps: f64, rtt_ms: f64, timestamp: Instant) -> Self {
        Self {
            bitrate_kbps,
            rtt_ms,
            connected: true,
            timestamp,
        }
    }

    /// No publisher, server unreachable, or unreadable response
    pub fn disconnected(timestamp: Instant) -> Self {
        Self {
            bitrate_kbps: 0.0,
            rtt_ms: 0.0,
            connected: false,
            timestamp,
        }
    }

    /// Numeric readings, or `None` when disconnected
    pub fn readings(&self) -> Option<(f64, f64)> {
        self.connected.then_some((self.bitrate_kbps, self.rtt_ms))
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.readings() {
            Some((bitrate, rtt)) => write!(f, "{} kbps, RTT {} ms", bitrate, rtt),
            None => write!(f, "disconnected"),
        }
    }
}

/// Why a sample counts as degraded
///
/// Either condition alone is enough; both may hold at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Degradation {
    /// Bitrate at the time of the trigger
    pub bitrate_kbps: f64,
    /// RTT at the time of the trigger
    pub rtt_ms: f64,
    /// Bitrate fell below its threshold
    pub low_bitrate: bool,
    /// RTT reached its threshold
    pub high_rtt: bool,
}

impl Degradation {
    /// Check a connected sample against thresholds
    ///
    /// Returns `None` for healthy or disconnected samples.
    pub fn detect(sample: &Sample, bitrate_threshold_kbps: f64, rtt_threshold_ms: f64) -> Option<Self> {
        let (bitrate_kbps, rtt_ms) = sample.readings()?;
        let low_bitrate = bitrate_kbps < bitrate_threshold_kbps;
        let high_rtt = rtt_ms >= rtt_threshold_ms;

        (low_bitrate || high_rtt).then_some(Self {
            bitrate_kbps,
            rtt_ms,
            low_bitrate,
            high_rtt,
        })
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reasons = Vec::with_capacity(2);
        if self.low_bitrate {
            reasons.push(format!("Low bitrate: {} kbps", self.bitrate_kbps));
        }
        if self.high_rtt {
            reasons.push(format!("High RTT: {} ms", self.rtt_ms));
        }
        write!(f, "{}", reasons.join(" / "))
    }
}
