//! Run state definition
//!
//! Polling interval and keep-alive timestamp. Owned by the main loop,
//! written by host commands, read by the watchdog and the cadence.

use luxstat_protocol::Command;

/// What the main loop must do after a command was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Nothing visible changed
    None,
    /// Redraw now, outside the normal polling cadence
    Refresh,
}

/// Process-wide run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunState {
    /// Slow period for sensor reads and refreshes
    polling_interval_ms: u32,
    /// Uptime of the last keep-alive (or of boot)
    last_keep_alive_ms: u64,
}

impl RunState {
    /// Create the boot-time state
    pub const fn new(polling_interval_ms: u32, now_ms: u64) -> Self {
        Self {
            polling_interval_ms,
            last_keep_alive_ms: now_ms,
        }
    }

    /// Current polling interval in milliseconds
    pub const fn polling_interval_ms(&self) -> u32 {
        self.polling_interval_ms
    }

    /// Uptime of the last keep-alive
    pub const fn last_keep_alive_ms(&self) -> u64 {
        self.last_keep_alive_ms
    }

    /// Record a keep-alive
    ///
    /// The timestamp never moves backwards.
    pub fn keep_alive(&mut self, now_ms: u64) {
        self.last_keep_alive_ms = self.last_keep_alive_ms.max(now_ms);
    }

    /// Set a new polling interval
    pub fn set_polling_interval(&mut self, millis: u32) {
        self.polling_interval_ms = millis;
    }

    /// Milliseconds since the last keep-alive
    pub const fn since_keep_alive(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_keep_alive_ms)
    }

    /// Apply a host command
    pub fn apply(&mut self, command: Command, now_ms: u64) -> Effect {
        match command {
            Command::KeepAlive => {
                self.keep_alive(now_ms);
                Effect::None
            }
            Command::SetInterval { millis } => {
                self.set_polling_interval(millis);
                Effect::Refresh
            }
        }
    }
}
