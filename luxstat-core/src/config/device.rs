//! Device configuration types
//!
//! Display geometry and loop timing. The defaults match the stock
//! 128x64 OLED build.

/// Default display width in pixels
pub const DEFAULT_WIDTH: u32 = 128;
/// Default display height in pixels
pub const DEFAULT_HEIGHT: u32 = 64;
/// Default border thickness in pixels
pub const DEFAULT_BORDER: u32 = 3;
/// Default text row pitch basis in pixels
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Scheduler tick: commands and the watchdog are serviced this often
pub const POLLING_INTERVAL_MS: u32 = 500;
/// Sensor read/refresh period at boot
pub const DEFAULT_POLLING_TIME_MS: u32 = 500;
/// Host silence tolerated before a restart
pub const MAX_NO_KEEP_ALIVE_SECONDS: u32 = 60;

/// Display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayGeometry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Thickness of the white frame around the black inset
    pub border: u32,
    /// Nominal font height; rows are spaced `font_size + 2` apart
    pub font_size: u32,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            border: DEFAULT_BORDER,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl DisplayGeometry {
    /// Left edge of text rows
    pub const fn text_x(&self) -> i32 {
        (self.border * 2 + 4) as i32
    }

    /// Vertical centre of text row `row`
    pub const fn row_center_y(&self, row: usize) -> i32 {
        (self.border * 2 + 2) as i32 + row as i32 * self.row_pitch() as i32
    }

    /// Distance between consecutive rows
    pub const fn row_pitch(&self) -> u32 {
        self.font_size + 2
    }

    /// Rows that fit inside the inset
    pub const fn max_rows(&self) -> usize {
        let inner = self.height.saturating_sub(self.border * 2);
        (inner / self.row_pitch()) as usize
    }
}

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Fast tick for command and watchdog servicing
    pub tick_ms: u32,
    /// Initial slow period for sensor reads and refreshes
    pub polling_ms: u32,
    /// Keep-alive ceiling; exceeding it restarts the device
    pub keep_alive_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_ms: POLLING_INTERVAL_MS,
            polling_ms: DEFAULT_POLLING_TIME_MS,
            keep_alive_timeout_ms: MAX_NO_KEEP_ALIVE_SECONDS as u64 * 1000,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub display: DisplayGeometry,
    pub timing: Timing,
}
