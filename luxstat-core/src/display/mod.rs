//! Status display
//!
//! One-time static frame plus a fixed set of text rows redrawn in place.

pub mod renderer;

pub use renderer::{RenderStats, Renderer};
