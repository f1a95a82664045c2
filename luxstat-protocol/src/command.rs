//! Command parsing for the host control protocol

/// Leading character of the keep-alive command
pub const KEEP_ALIVE: u8 = b'K';

/// Leading character of the set-interval command
pub const SET_INTERVAL: u8 = b'T';

/// Errors that can occur while parsing a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Line was empty (or whitespace only)
    Empty,
    /// Leading character is not a known command
    Unknown(u8),
    /// `T` without a value
    MissingValue,
    /// `T` value is not a non-negative integer that fits in 32 bits
    InvalidValue,
    /// Extra characters after a command that takes no argument
    TrailingData,
}

/// A command from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Host is alive
    KeepAlive,
    /// New polling interval in milliseconds
    SetInterval { millis: u32 },
}

impl Command {
    /// Parse a single command line
    ///
    /// Surrounding ASCII whitespace (including a trailing `\r`) is ignored.
    pub fn parse(line: &[u8]) -> Result<Self, CommandError> {
        let line = line.trim_ascii();
        let (&head, rest) = line.split_first().ok_or(CommandError::Empty)?;

        match head {
            KEEP_ALIVE => {
                if rest.is_empty() {
                    Ok(Command::KeepAlive)
                } else {
                    Err(CommandError::TrailingData)
                }
            }
            SET_INTERVAL => {
                let value = rest.trim_ascii();
                if value.is_empty() {
                    return Err(CommandError::MissingValue);
                }
                let text = core::str::from_utf8(value).map_err(|_| CommandError::InvalidValue)?;
                let millis = text.parse::<u32>().map_err(|_| CommandError::InvalidValue)?;
                Ok(Command::SetInterval { millis })
            }
            other => Err(CommandError::Unknown(other)),
        }
    }
}
