//! Safety monitoring
//!
//! Detects a silent host and asks for a restart.

pub mod watchdog;

pub use watchdog::{KeepAliveExpired, Watchdog, WatchdogStatus};
