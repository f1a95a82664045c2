//! Run state
//!
//! The only mutable state shared between the command processor, the
//! watchdog and the scheduler.

pub mod run_state;

pub use run_state::{Effect, RunState};
