//! Alert decision engine
//!
//! Pure, synchronous state machine. No I/O and no clock reads; callers pass
//! the current instant into every step.

pub mod config;
pub mod machine;

pub use config::{EngineConfig, MAX_TIMER, POLL_INTERVAL, WARMUP};
pub use machine::{AlertEngine, Phase, Step, Transition};
