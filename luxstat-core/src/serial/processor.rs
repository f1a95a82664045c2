//! Serial command processor
//!
//! Best-effort by contract: malformed lines are counted and dropped,
//! nothing is ever written back to the host.

use luxstat_hal::ControlChannel;
use luxstat_protocol::{Command, LineBuffer};

/// Bytes pulled from the channel per read
pub const READ_CHUNK: usize = 64;

/// Reads per poll; bounds the time spent draining a chatty host
const MAX_READS_PER_POLL: usize = 4;

/// Counters for one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntakeStats {
    /// Commands handed to the caller
    pub accepted: u16,
    /// Lines that did not parse
    pub dropped: u16,
    /// Channel read errors
    pub read_errors: u16,
}

/// Turns channel bytes into commands
#[derive(Debug, Clone, Default)]
pub struct CommandProcessor {
    lines: LineBuffer,
}

impl CommandProcessor {
    /// Create a new processor
    pub const fn new() -> Self {
        Self {
            lines: LineBuffer::new(),
        }
    }

    /// Drain whatever the channel already holds
    ///
    /// `on_command` runs synchronously for each complete, valid line, in
    /// the order the lines arrived. Returns immediately when the channel
    /// has nothing pending.
    pub fn poll<C, F>(&mut self, channel: &mut C, mut on_command: F) -> IntakeStats
    where
        C: ControlChannel,
        F: FnMut(Command),
    {
        let mut stats = IntakeStats::default();
        let mut buf = [0u8; READ_CHUNK];

        for _ in 0..MAX_READS_PER_POLL {
            let len = match channel.read_available(&mut buf) {
                Ok(0) => break,
                Ok(len) => len,
                Err(_) => {
                    stats.read_errors += 1;
                    break;
                }
            };

            self.lines.feed_bytes(&buf[..len], |line| match Command::parse(line) {
                Ok(command) => {
                    stats.accepted += 1;
                    on_command(command);
                }
                Err(_) => stats.dropped += 1,
            });
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    /// Channel that returns one scripted chunk per read
    pub(crate) struct Script<'a> {
        pub chunks: &'a [&'a [u8]],
        pub fail: bool,
    }

    impl ControlChannel for Script<'_> {
        type Error = ();

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            if self.fail {
                return Err(());
            }
            let Some((first, rest)) = self.chunks.split_first() else {
                return Ok(0);
            };
            buf[..first.len()].copy_from_slice(first);
            self.chunks = rest;
            Ok(first.len())
        }
    }

    fn drain(processor: &mut CommandProcessor, chunks: &[&[u8]]) -> (Vec<Command, 8>, IntakeStats) {
        let mut channel = Script { chunks, fail: false };
        let mut commands = Vec::new();
        let stats = processor.poll(&mut channel, |c| commands.push(c).unwrap());
        (commands, stats)
    }

    #[test]
    fn test_idle_channel() {
        let mut processor = CommandProcessor::new();
        let (commands, stats) = drain(&mut processor, &[]);
        assert!(commands.is_empty());
        assert_eq!(stats, IntakeStats::default());
    }

    #[test]
    fn test_batched_commands_in_order() {
        let mut processor = CommandProcessor::new();
        let (commands, stats) = drain(&mut processor, &[b"T100\nK\nT200\n"]);
        assert_eq!(
            commands.as_slice(),
            &[
                Command::SetInterval { millis: 100 },
                Command::KeepAlive,
                Command::SetInterval { millis: 200 },
            ]
        );
        assert_eq!(stats.accepted, 3);
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let mut processor = CommandProcessor::new();
        let (commands, stats) = drain(&mut processor, &[b"\nT\nTx\nZ9\nK\n"]);
        assert_eq!(commands.as_slice(), &[Command::KeepAlive]);
        assert_eq!(stats.dropped, 4);
    }

    #[test]
    fn test_split_command_completes_on_later_poll() {
        let mut processor = CommandProcessor::new();
        let (commands, _) = drain(&mut processor, &[b"T15"]);
        assert!(commands.is_empty());

        let (commands, _) = drain(&mut processor, &[b"00\r\n"]);
        assert_eq!(commands.as_slice(), &[Command::SetInterval { millis: 1500 }]);
    }

    #[test]
    fn test_read_error_is_swallowed() {
        let mut processor = CommandProcessor::new();
        let mut channel = Script { chunks: &[b"K\n"], fail: true };
        let stats = processor.poll(&mut channel, |_| panic!("no command expected"));
        assert_eq!(stats.read_errors, 1);
    }
}
