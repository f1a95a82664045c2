//! Telemetry rows
//!
//! Turns sensor readings and run state into the text lines shown on the
//! display.

pub mod formatter;

pub use formatter::{
    format_interval, render_row, render_rows, Field, Line, RowSpec, Source, DEFAULT_LAYOUT,
    LINE_CAPACITY, MAX_ROWS,
};
