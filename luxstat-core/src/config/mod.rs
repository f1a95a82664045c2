//! Configuration types
//!
//! Board-agnostic configuration structures. Values are fixed at build
//! time; nothing is persisted across reboots.

pub mod device;

pub use device::*;
