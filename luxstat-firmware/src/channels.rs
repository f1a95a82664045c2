//! Inter-task communication
//!
//! Bytes received over USB serial flow to the main loop through a pipe;
//! the main loop drains it without awaiting.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;

/// Pipe capacity; several command lines fit with room to spare
const COMMAND_PIPE_SIZE: usize = 256;

/// Host bytes from the USB CDC-ACM port
pub static COMMAND_PIPE: Pipe<CriticalSectionRawMutex, COMMAND_PIPE_SIZE> = Pipe::new();
