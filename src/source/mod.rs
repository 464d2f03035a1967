//! Sample sources
//!
//! A source yields the latest link reading on demand. It must never fail:
//! unreachable servers, bad responses and missing publishers all come back
//! as `connected = false`.

pub mod http;
pub mod stats;

pub use http::HttpStatsSource;
pub use stats::{parse_publisher, PublisherStats};

use crate::domain::Sample;
use std::time::Duration;

/// Provider of link health samples
pub trait SampleSource {
    /// Take one reading
    fn poll(&mut self) -> Sample;

    /// Extra wait requested after consecutive failures
    ///
    /// The driver waits for the longer of this and its poll interval.
    fn retry_delay(&self) -> Option<Duration> {
        None
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn poll(&mut self) -> Sample {
        (**self).poll()
    }

    fn retry_delay(&self) -> Option<Duration> {
        (**self).retry_delay()
    }
}
