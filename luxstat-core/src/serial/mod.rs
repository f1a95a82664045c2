//! Host command intake
//!
//! Drains the control channel without blocking and hands parsed
//! commands to the main loop in arrival order.

pub mod processor;

pub use processor::{CommandProcessor, IntakeStats, READ_CHUNK};
