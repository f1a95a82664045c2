//! Inbound serial control channel
//!
//! The control loop must never block on the host, so the only operation
//! is "give me whatever is already buffered".

/// Non-blocking inbound byte stream
pub trait ControlChannel {
    /// Error type for receive operations
    type Error;

    /// Copy already-received bytes into `buf`
    ///
    /// Returns `Ok(0)` immediately when nothing is pending. Never waits
    /// for more data to arrive.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Any `embedded-io` reader that can report readiness is a control channel
impl<T> ControlChannel for T
where
    T: embedded_io::Read + embedded_io::ReadReady,
{
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.read_ready()? {
            return Ok(0);
        }
        self.read(buf)
    }
}
