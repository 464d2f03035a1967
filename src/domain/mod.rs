//! Domain models for srt-alert
//!
//! Link health samples, degradation reasons and the reconnect backoff.

pub mod backoff;
pub mod sample;

pub use backoff::Backoff;
pub use sample::{Degradation, Sample};
