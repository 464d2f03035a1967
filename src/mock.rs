//! Mock implementations for testing
//!
//! Provides a scripted sample source and a recording sink for driving the
//! monitor without a stats server or OBS.

use crate::domain::Sample;
use crate::error::{ObsError, SinkError};
use crate::sink::AlertSink;
use crate::source::SampleSource;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source that replays a fixed list of samples
///
/// Once the script runs out, the last sample is repeated.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    samples: VecDeque<Sample>,
    last: Option<Sample>,
    retry_delay: Option<Duration>,
}

impl ScriptedSource {
    /// Create a source from samples in playback order
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            last: None,
            retry_delay: None,
        }
    }

    /// Builder: report this retry delay to the driver
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Samples not yet played
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleSource for ScriptedSource {
    fn poll(&mut self) -> Sample {
        let sample = self
            .samples
            .pop_front()
            .or(self.last)
            .unwrap_or_else(|| Sample::disconnected(Instant::now()));
        self.last = Some(sample);
        sample
    }

    fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay
    }
}

/// Build samples at whole-second offsets from `t0`
///
/// `None` readings produce disconnected samples.
pub fn timeline(t0: Instant, points: &[(u64, Option<(f64, f64)>)]) -> Vec<Sample> {
    points
        .iter()
        .map(|&(secs, reading)| {
            let at = t0 + Duration::from_secs(secs);
            match reading {
                Some((bitrate, rtt)) => Sample::connected(bitrate, rtt, at),
                None => Sample::disconnected(at),
            }
        })
        .collect()
}

/// Sink that records every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Vec<bool>,
    failures: usize,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls fail without being recorded
    pub fn fail_next(&mut self, n: usize) {
        self.failures = n;
    }

    /// Successful calls, in order
    pub fn calls(&self) -> &[bool] {
        &self.calls
    }

    /// Last value successfully applied
    pub fn visible(&self) -> Option<bool> {
        self.calls.last().copied()
    }
}

impl AlertSink for RecordingSink {
    fn set_visible(&mut self, visible: bool) -> Result<(), SinkError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(SinkError::Obs(ObsError::Closed));
        }
        self.calls.push(visible);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
