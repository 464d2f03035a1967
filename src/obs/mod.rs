//! OBS websocket abstraction layer
//!
//! Minimal obs-websocket v5 client used by the overlay sink.

pub mod client;
pub mod protocol;

#[cfg(test)]
pub(crate) mod fake;

pub use client::ObsClient;
