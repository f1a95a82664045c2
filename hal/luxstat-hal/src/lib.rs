//! Luxstat Hardware Abstraction Layer
//!
//! This crate defines the small set of board services the control loop
//! needs beyond the sensor/display bus. Chip-specific HALs (currently
//! RP2040) implement them so the core logic stays host-testable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (luxstat-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  luxstat-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ luxstat-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::ControlChannel`] - Non-blocking inbound serial
//! - [`clock::Monotonic`] - Millisecond uptime clock
//! - [`reset::SystemReset`] - Full device restart

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod reset;
pub mod serial;

// Re-export key traits at crate root for convenience
pub use clock::Monotonic;
pub use reset::SystemReset;
pub use serial::ControlChannel;
