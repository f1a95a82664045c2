//! Display panel drivers

pub mod ssd1306;

pub use ssd1306::{DisplayError, Ssd1306};
