//! Board-agnostic core logic for the ambient light display firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Light sensor and display panel traits
//! - Sensor probe chain (first chip that constructs and configures wins)
//! - Telemetry rows with per-row fallback fields
//! - Display renderer (static frame plus fixed text rows)
//! - Run state, keep-alive watchdog and the two-speed main loop
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod safety;
pub mod scheduler;
pub mod sensor;
pub mod serial;
pub mod state;
pub mod telemetry;
pub mod traits;

#[cfg(test)]
mod testing;
