//! Monotonic time source

/// Millisecond uptime clock
///
/// Must never go backwards while the device is running. The count
/// restarts from zero after a reset.
pub trait Monotonic {
    /// Milliseconds elapsed since boot
    fn now_ms(&self) -> u64;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
