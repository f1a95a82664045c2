//! Build-time device configuration
//!
//! `build.rs` validates `device.toml` and emits the constants included
//! below.

use luxstat_core::config::{DeviceConfig, DisplayGeometry, Timing};

include!(concat!(env!("OUT_DIR"), "/device_config.rs"));

/// Configuration baked in from device.toml
pub const fn device_config() -> DeviceConfig {
    DeviceConfig {
        display: DisplayGeometry {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
            border: DISPLAY_BORDER,
            font_size: DISPLAY_FONT_SIZE,
        },
        timing: Timing {
            tick_ms: TICK_MS,
            polling_ms: POLLING_MS,
            keep_alive_timeout_ms: KEEP_ALIVE_TIMEOUT_MS,
        },
    }
}
