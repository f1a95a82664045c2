//! Keep-alive watchdog
//!
//! The host must send `K` regularly. If it goes quiet for longer than
//! the ceiling the device assumes the host (or itself) is wedged and
//! restarts. There is no softer recovery path.

use crate::config::Timing;
use crate::state::RunState;

/// Host silence exceeded the ceiling; the device must restart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeepAliveExpired {
    /// Milliseconds since the last keep-alive
    pub elapsed_ms: u64,
}

impl KeepAliveExpired {
    /// Elapsed silence in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }
}

/// Watchdog check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogStatus {
    /// Host heard from recently enough
    Ok,
    /// Ceiling exceeded
    Expired(KeepAliveExpired),
}

/// Keep-alive watchdog
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    /// Maximum tolerated silence (ms)
    timeout_ms: u64,
}

impl Watchdog {
    /// Create a watchdog with the given ceiling
    pub const fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    /// Create a watchdog from the loop timing
    pub const fn from_timing(timing: &Timing) -> Self {
        Self::new(timing.keep_alive_timeout_ms)
    }

    /// Configured ceiling in milliseconds
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Compare host silence against the ceiling
    ///
    /// Expires strictly after the ceiling, never at it.
    pub fn check(&self, state: &RunState, now_ms: u64) -> WatchdogStatus {
        let elapsed_ms = state.since_keep_alive(now_ms);
        if elapsed_ms > self.timeout_ms {
            WatchdogStatus::Expired(KeepAliveExpired { elapsed_ms })
        } else {
            WatchdogStatus::Ok
        }
    }

    /// Same as [`Watchdog::check`], shaped for `?`
    pub fn ensure(&self, state: &RunState, now_ms: u64) -> Result<(), KeepAliveExpired> {
        match self.check(state, now_ms) {
            WatchdogStatus::Ok => Ok(()),
            WatchdogStatus::Expired(expired) => Err(expired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CEILING_MS: u64 = 60_000;

    #[test]
    fn test_quiet_host_within_ceiling() {
        let watchdog = Watchdog::new(CEILING_MS);
        let state = RunState::new(500, 0);
        assert_eq!(watchdog.check(&state, 30_000), WatchdogStatus::Ok);
    }

    #[test]
    fn test_expiry_is_strictly_after_ceiling() {
        let watchdog = Watchdog::new(CEILING_MS);
        let state = RunState::new(500, 0);
        assert_eq!(watchdog.check(&state, CEILING_MS), WatchdogStatus::Ok);
        assert_eq!(
            watchdog.check(&state, CEILING_MS + 1),
            WatchdogStatus::Expired(KeepAliveExpired {
                elapsed_ms: CEILING_MS + 1
            })
        );
    }

    #[test]
    fn test_keep_alive_restarts_the_clock() {
        let watchdog = Watchdog::new(CEILING_MS);
        let mut state = RunState::new(500, 0);
        state.keep_alive(50_000);
        assert!(watchdog.ensure(&state, 100_000).is_ok());
        assert!(watchdog.ensure(&state, 110_001).is_err());
    }

    #[test]
    fn test_default_timing_ceiling() {
        let watchdog = Watchdog::from_timing(&Timing::default());
        assert_eq!(watchdog.timeout_ms(), 60_000);
    }

    #[test]
    fn test_elapsed_secs() {
        let expired = KeepAliveExpired { elapsed_ms: 60_500 };
        assert_eq!(expired.elapsed_secs(), 60.5);
    }
}
