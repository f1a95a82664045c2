//! Main loop scheduling
//!
//! Two speeds: a fast tick that services host commands and the watchdog,
//! and a slow polling cycle (a whole number of ticks) that reads the
//! sensor and redraws the display.

pub mod cadence;
pub mod controller;

pub use cadence::ticks_per_cycle;
pub use controller::{Controller, PollReport};
