//! Device restart

/// Full device restart
///
/// There is no way back from [`SystemReset::restart`]: all RAM state is
/// discarded and the firmware boots again from scratch.
pub trait SystemReset {
    /// Restart the device immediately
    fn restart(&mut self) -> !;
}
