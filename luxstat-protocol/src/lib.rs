//! Luxstat Host Control Protocol
//!
//! This crate defines the line-oriented ASCII protocol the host uses to
//! steer the display over USB serial. The protocol is deliberately
//! best-effort: the device never answers, and anything it cannot parse
//! is dropped.
//!
//! # Protocol Overview
//!
//! One command per line, lines terminated by `\n` (a preceding `\r` is
//! tolerated):
//! ```text
//! K          keep-alive, resets the watchdog clock
//! T<millis>  set the polling interval, e.g. T1500 = 1.5 s
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod line;

pub use command::{Command, CommandError, KEEP_ALIVE, SET_INTERVAL};
pub use line::{LineBuffer, MAX_LINE_LEN};
