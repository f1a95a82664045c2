//! Control channel backed by an embassy pipe
//!
//! The USB task writes received bytes into a static [`Pipe`]; the main
//! loop drains it through [`PipeChannel`] without ever awaiting.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::{Pipe, TryReadError};
use luxstat_hal::ControlChannel;

/// Read side of a byte pipe
pub struct PipeChannel<'a, M: RawMutex, const N: usize> {
    pipe: &'a Pipe<M, N>,
}

impl<'a, M: RawMutex, const N: usize> PipeChannel<'a, M, N> {
    pub fn new(pipe: &'a Pipe<M, N>) -> Self {
        Self { pipe }
    }
}

impl<M: RawMutex, const N: usize> ControlChannel for PipeChannel<'_, M, N> {
    type Error = Infallible;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.pipe.try_read(buf) {
            Ok(len) => Ok(len),
            Err(TryReadError::Empty) => Ok(0),
        }
    }
}
