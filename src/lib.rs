//! srt-alert - SRT stream health monitor
//!
//! This library polls an SRT server's statistics, decides when the stream is
//! degraded, and shows or hides a warning overlay in OBS. The decision logic
//! lives in a pure state machine that never reads a clock or touches the
//! network.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Samples, degradation and retry backoff
//! - [`engine`]: Alert state machine
//! - [`error`]: Error types
//! - [`obs`]: obs-websocket client
//! - [`services`]: Monitor loop
//! - [`sink`]: Overlay sinks
//! - [`source`]: Stats sources

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod obs;
pub mod services;
pub mod sink;
pub mod source;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
