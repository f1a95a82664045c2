//! Newline-delimited line assembly
//!
//! Serial reads hand over whatever bytes happen to be buffered: several
//! commands at once, or half of one. [`LineBuffer`] turns that stream
//! back into complete lines, in arrival order.

use heapless::Vec;

/// Longest accepted command line, excluding the terminator
pub const MAX_LINE_LEN: usize = 32;

/// Line terminator
const NEWLINE: u8 = b'\n';

/// Assembles complete lines from arbitrary byte chunks
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    /// Current line exceeded [`MAX_LINE_LEN`]; drop it at the next newline
    overflowed: bool,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed a single byte
    ///
    /// Returns the completed line when `byte` terminates one. Over-long
    /// lines are swallowed whole.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8, MAX_LINE_LEN>> {
        if byte == NEWLINE {
            let line = core::mem::take(&mut self.buffer);
            let overflowed = core::mem::replace(&mut self.overflowed, false);
            return if overflowed { None } else { Some(line) };
        }

        if !self.overflowed && self.buffer.push(byte).is_err() {
            self.overflowed = true;
            self.buffer.clear();
        }
        None
    }

    /// Feed a chunk, calling `on_line` for every line it completes
    pub fn feed_bytes<F>(&mut self, bytes: &[u8], mut on_line: F)
    where
        F: FnMut(&[u8]),
    {
        for &byte in bytes {
            if let Some(line) = self.feed(byte) {
                on_line(&line);
            }
        }
    }
}
