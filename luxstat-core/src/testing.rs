//! Test doubles shared by the unit tests

use core::cell::Cell;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;
use luxstat_hal::{ControlChannel, Monotonic};

use crate::config::{DEFAULT_BORDER, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::traits::{Capability, CapabilitySet, LightSensor, Panel, Reading, SensorError};

const W: usize = DEFAULT_WIDTH as usize;
const H: usize = DEFAULT_HEIGHT as usize;

#[derive(Debug)]
pub struct FlushFailed;

/// In-memory 128x64 panel
pub struct FakePanel {
    pixels: [[bool; W]; H],
    pub flushes: u32,
    pub fail_flush: bool,
}

impl FakePanel {
    pub fn new() -> Self {
        Self {
            pixels: [[false; W]; H],
            flushes: 0,
            fail_flush: false,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y][x]
    }

    /// Lit pixels inside the inset within a text row band
    pub fn lit_in_band(&self, center_y: i32) -> usize {
        let border = DEFAULT_BORDER as usize;
        let top = (center_y - 6).max(border as i32) as usize;
        let bottom = ((center_y + 6) as usize).min(H - border);
        (top..bottom)
            .flat_map(|y| (border..W - border).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixels[y][x])
            .count()
    }
}

impl OriginDimensions for FakePanel {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl DrawTarget for FakePanel {
    type Color = BinaryColor;
    type Error = FlushFailed;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..W as i32).contains(&point.x) && (0..H as i32).contains(&point.y) {
                self.pixels[point.y as usize][point.x as usize] = color.is_on();
            }
        }
        Ok(())
    }
}

impl Panel for FakePanel {
    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        if self.fail_flush {
            Err(FlushFailed)
        } else {
            Ok(())
        }
    }
}

/// Sensor with a fixed set of readings and optional transient faults
pub struct FakeSensor {
    pub capabilities: CapabilitySet,
    pub failing: CapabilitySet,
    pub reads: u32,
    pub lux: f32,
}

impl FakeSensor {
    pub fn with(capabilities: &[Capability]) -> Self {
        Self {
            capabilities: CapabilitySet::of(capabilities),
            failing: CapabilitySet::EMPTY,
            reads: 0,
            lux: 123.4,
        }
    }
}

impl LightSensor for FakeSensor {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        self.reads += 1;
        if !self.capabilities.contains(capability) {
            return Err(SensorError::Unsupported);
        }
        if self.failing.contains(capability) {
            return Err(SensorError::Bus);
        }
        Ok(match capability {
            Capability::Lux => Reading::Value(self.lux),
            Capability::ColorTemperature => Reading::Value(5200.0),
            Capability::Color => Reading::Rgb(0xff8000),
            _ => Reading::Count(77),
        })
    }
}

/// Simulated uptime shared by [`SimClock`] and [`SimDelay`]
pub struct SimTime {
    now_ms: Cell<u64>,
}

impl SimTime {
    pub const fn new() -> Self {
        Self { now_ms: Cell::new(0) }
    }

    pub fn now(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

pub struct SimClock<'a>(pub &'a SimTime);

impl Monotonic for SimClock<'_> {
    fn now_ms(&self) -> u64 {
        self.0.now()
    }
}

/// Delay that advances simulated time instead of sleeping
pub struct SimDelay<'a>(pub &'a SimTime);

impl DelayNs for SimDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.advance(u64::from(ns) / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.advance(u64::from(ms));
    }
}

/// Control channel fed by the test, one chunk per read
pub struct ScriptChannel {
    pending: Vec<Vec<u8, 64>, 16>,
    pub reads: u32,
}

impl ScriptChannel {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            reads: 0,
        }
    }

    /// Queue bytes for the next read
    pub fn send(&mut self, bytes: &[u8]) {
        self.pending
            .push(Vec::from_slice(bytes).unwrap())
            .unwrap();
    }
}

impl ControlChannel for ScriptChannel {
    type Error = Infallible;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.reads += 1;
        if self.pending.is_empty() {
            return Ok(0);
        }
        let chunk = self.pending.remove(0);
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}
