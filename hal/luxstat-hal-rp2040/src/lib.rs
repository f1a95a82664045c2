//! RP2040-specific HAL for the ambient light display firmware
//!
//! This crate provides embassy-backed implementations of the shared
//! `luxstat-hal` traits:
//!
//! - Pipe-backed control channel fed by the USB serial task
//! - Uptime clock on `embassy-time`
//! - Core reset through the SCB

#![no_std]

pub mod clock;
pub mod reset;
pub mod serial;

pub use clock::EmbassyClock;
pub use reset::ScbReset;
pub use serial::PipeChannel;

// Re-export shared traits from luxstat-hal for convenience
pub use luxstat_hal::{ControlChannel, Monotonic, SystemReset};
