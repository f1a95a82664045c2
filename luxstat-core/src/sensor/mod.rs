//! Sensor selection
//!
//! Picks the one light sensor the device will use until the next reboot.

pub mod probe;

pub use probe::{probe, Candidate, ProbeError, ProbeReport, MAX_CANDIDATES};
