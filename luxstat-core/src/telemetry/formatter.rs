//! Row formatter
//!
//! Each display row is an ordered list of candidate fields. The first
//! field that can be read wins the row; a field that is unsupported by
//! the chip and one that failed to read are treated alike and simply
//! fall through to the next candidate.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::state::RunState;
use crate::traits::{Capability, LightSensor, Reading};

/// Maximum characters in one rendered line
pub const LINE_CAPACITY: usize = 32;

/// Maximum rows in a layout
pub const MAX_ROWS: usize = 8;

/// A rendered text line
pub type Line = String<LINE_CAPACITY>;

/// Where a field gets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    /// A sensor capability
    Sensor(Capability),
    /// The current polling interval; never fails
    PollingInterval,
}

/// A labelled candidate field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub label: &'static str,
    pub source: Source,
}

impl Field {
    /// Field backed by a sensor capability
    pub const fn sensor(label: &'static str, capability: Capability) -> Self {
        Self {
            label,
            source: Source::Sensor(capability),
        }
    }

    /// Field showing the polling interval
    pub const fn polling(label: &'static str) -> Self {
        Self {
            label,
            source: Source::PollingInterval,
        }
    }

    /// Render this field, or `None` if it cannot be read right now
    pub fn render<S: LightSensor + ?Sized>(&self, sensor: &mut S, state: &RunState) -> Option<Line> {
        let mut line = Line::new();
        match self.source {
            Source::Sensor(capability) => {
                let reading: Reading = sensor.read(capability).ok()?;
                write!(line, "{}: {}", self.label, reading).ok()?;
            }
            Source::PollingInterval => {
                write!(line, "{}: ", self.label).ok()?;
                format_interval(&mut line, state.polling_interval_ms()).ok()?;
                line.push('s').ok()?;
            }
        }
        Some(line)
    }
}

/// Ordered candidates for one row
pub type RowSpec = &'static [Field];

/// Stock layout: lux, an infrared-ish row, a broadband-ish row, polling
pub const DEFAULT_LAYOUT: &[RowSpec] = &[
    &[Field::sensor("Lux", Capability::Lux)],
    &[
        Field::sensor("IR", Capability::Infrared),
        Field::sensor("Color Temp", Capability::ColorTemperature),
        Field::sensor("White", Capability::White),
        Field::sensor("Proximity", Capability::Proximity),
    ],
    &[
        Field::sensor("Broadband", Capability::Broadband),
        Field::sensor("Color", Capability::Color),
        Field::sensor("Light", Capability::Light),
        Field::sensor("Proximity", Capability::Proximity),
    ],
    &[Field::polling("Polling")],
];

/// Render one row: first field that reads successfully wins
pub fn render_row<S: LightSensor + ?Sized>(
    row: RowSpec,
    sensor: &mut S,
    state: &RunState,
) -> Option<Line> {
    row.iter().find_map(|field| field.render(sensor, state))
}

/// Render every row of a layout, keeping positions (`None` = empty row)
pub fn render_rows<S: LightSensor + ?Sized>(
    layout: &[RowSpec],
    sensor: &mut S,
    state: &RunState,
) -> Vec<Option<Line>, MAX_ROWS> {
    layout
        .iter()
        .take(MAX_ROWS)
        .map(|row| render_row(row, sensor, state))
        .collect()
}

/// Write milliseconds as seconds with no trailing zeros (500 -> "0.5")
pub fn format_interval<W: Write>(out: &mut W, millis: u32) -> core::fmt::Result {
    let whole = millis / 1000;
    let mut frac = millis % 1000;
    write!(out, "{}.", whole)?;
    if frac == 0 {
        return out.write_char('0');
    }
    let mut digits = 3;
    while frac % 10 == 0 {
        frac /= 10;
        digits -= 1;
    }
    write!(out, "{:0width$}", frac, width = digits)
}
