//! Polling cadence
//!
//! Converts the polling interval into a tick count. The interval is
//! rounded to the nearest tick (ties to even) and never drops below one
//! tick, so every cycle ends in a sensor read and a refresh.

/// Ticks in one polling cycle
pub const fn ticks_per_cycle(polling_ms: u32, tick_ms: u32) -> u32 {
    if tick_ms == 0 {
        return 1;
    }

    let whole = polling_ms / tick_ms;
    let twice_rem = (polling_ms % tick_ms) as u64 * 2;
    let rounded = if twice_rem > tick_ms as u64 || (twice_rem == tick_ms as u64 && whole % 2 == 1) {
        whole + 1
    } else {
        whole
    };

    if rounded == 0 {
        1
    } else {
        rounded
    }
}
