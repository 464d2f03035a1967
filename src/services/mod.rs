//! Service layer
//!
//! The monitor loop that ties a sample source, the alert engine and an
//! overlay sink together.

pub mod monitor;

pub use monitor::{Monitor, MonitorConfig};
