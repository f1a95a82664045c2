//! TCS34725 color light-to-digital converter
//!
//! Clear, red, green and blue channels. Lux and color temperature follow
//! the DN40 open-air coefficients; color is gamma-corrected and packed
//! as 0xRRGGBB.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use luxstat_core::traits::{Capability, CapabilitySet, LightSensor, Reading, SensorError};
use micromath::F32Ext;

use super::bus_error;

/// Fixed I2C address (shared with the TSL2591)
pub const ADDRESS: u8 = 0x29;

/// Command bit plus auto-increment
const COMMAND: u8 = 0xA0;

/// Register addresses
pub mod reg {
    pub const ENABLE: u8 = 0x00;
    pub const ATIME: u8 = 0x01;
    pub const CONTROL: u8 = 0x0F;
    pub const ID: u8 = 0x12;
    /// Clear low byte; red, green and blue follow
    pub const CDATAL: u8 = 0x14;
}

/// TCS34721/TCS34725 and TCS34723/TCS34727
const DEVICE_IDS: [u8; 2] = [0x44, 0x4D];

const ENABLE_PON: u8 = 0x01;
const ENABLE_AEN: u8 = 0x02;

/// Length of one integration cycle in milliseconds
const CYCLE_MS: f32 = 2.4;
const CYCLE_US: u32 = 2_400;

/// Oscillator warm-up after PON before AEN may be set
const POWER_ON_US: u32 = 2_400;

// DN40 coefficients
const GLASS_ATTENUATION: f32 = 1.0;
const DEVICE_FACTOR: f32 = 310.0;
const R_COEF: f32 = 0.136;
const G_COEF: f32 = 1.0;
const B_COEF: f32 = -0.444;
const CT_COEF: f32 = 3810.0;
const CT_OFFSET: f32 = 1391.0;

/// Analog gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1,
    X4,
    X16,
    X60,
}

impl Gain {
    const fn bits(self) -> u8 {
        self as u8
    }

    fn factor(self) -> f32 {
        match self {
            Gain::X1 => 1.0,
            Gain::X4 => 4.0,
            Gain::X16 => 16.0,
            Gain::X60 => 60.0,
        }
    }
}

/// One set of raw channel counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawColor {
    pub clear: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl RawColor {
    /// Channels with the infrared component removed
    fn without_ir(&self) -> (f32, f32, f32) {
        let (r, g, b) = (self.red as f32, self.green as f32, self.blue as f32);
        let sum = r + g + b;
        let clear = self.clear as f32;
        let ir = if sum > clear { (sum - clear) / 2.0 } else { 0.0 };
        (r - ir, g - ir, b - ir)
    }

    /// Gamma-corrected 0xRRGGBB, each channel normalised to clear
    pub fn packed_rgb(&self) -> u32 {
        if self.clear == 0 {
            return 0;
        }
        let channel = |value: u16| -> u32 {
            let ratio = (value as f32 / self.clear as f32 * 256.0) as u32;
            if ratio == 0 {
                return 0;
            }
            let corrected = F32Ext::powf(ratio as f32 / 255.0, 2.5) * 255.0;
            (corrected as u32).min(255)
        };
        (channel(self.red) << 16) | (channel(self.green) << 8) | channel(self.blue)
    }
}

/// TCS34725 driver
pub struct Tcs34725<I2C> {
    i2c: I2C,
    gain: Gain,
    /// Integration cycles of 2.4 ms, 1 to 256
    cycles: u16,
}

impl<I2C: I2c> Tcs34725<I2C> {
    /// Verify the chip ID and power the chip on
    ///
    /// The RGBC engine stays idle until [`Tcs34725::start`].
    pub fn new(i2c: I2C) -> Result<Self, SensorError> {
        let mut sensor = Self {
            i2c,
            gain: Gain::X1,
            cycles: 1,
        };
        if !DEVICE_IDS.contains(&sensor.read_u8(reg::ID)?) {
            return Err(SensorError::NotDetected);
        }
        sensor.write_u8(reg::ENABLE, ENABLE_PON)?;
        sensor.set_gain(Gain::X1)?;
        sensor.set_integration_time_ms(2.4)?;
        Ok(sensor)
    }

    /// Enable the RGBC engine and wait out its first integration
    pub fn start<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), SensorError> {
        delay.delay_us(POWER_ON_US);
        self.write_u8(reg::ENABLE, ENABLE_PON | ENABLE_AEN)?;
        // The first result lands one cycle after the integration window
        delay.delay_us((u32::from(self.cycles) + 1) * CYCLE_US);
        Ok(())
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), SensorError> {
        self.write_u8(reg::CONTROL, gain.bits())?;
        self.gain = gain;
        Ok(())
    }

    /// Set the integration time, rounded down to whole 2.4 ms cycles
    pub fn set_integration_time_ms(&mut self, millis: f32) -> Result<(), SensorError> {
        let cycles = ((millis / CYCLE_MS) as u16).clamp(1, 256);
        self.write_u8(reg::ATIME, (256 - cycles) as u8)?;
        self.cycles = cycles;
        Ok(())
    }

    /// Effective integration time
    pub fn integration_time_ms(&self) -> f32 {
        self.cycles as f32 * CYCLE_MS
    }

    /// Raw clear, red, green and blue counts
    pub fn raw(&mut self) -> Result<RawColor, SensorError> {
        let mut buf = [0u8; 8];
        self.i2c
            .write_read(ADDRESS, &[COMMAND | reg::CDATAL], &mut buf)
            .map_err(bus_error)?;
        Ok(RawColor {
            clear: u16::from_le_bytes([buf[0], buf[1]]),
            red: u16::from_le_bytes([buf[2], buf[3]]),
            green: u16::from_le_bytes([buf[4], buf[5]]),
            blue: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    /// Read channels, rejecting a saturated clear channel
    fn unsaturated(&mut self) -> Result<RawColor, SensorError> {
        let raw = self.raw()?;
        if u32::from(raw.clear) >= self.saturation() {
            return Err(SensorError::Saturated);
        }
        Ok(raw)
    }

    fn saturation(&self) -> u32 {
        let analog = if self.cycles > 63 {
            0xFFFF
        } else {
            1024 * u32::from(self.cycles)
        };
        // Short integration times also suffer from ripple
        if self.integration_time_ms() < 150.0 {
            analog - analog / 4
        } else {
            analog
        }
    }

    /// Illuminance via DN40
    pub fn illuminance(&mut self) -> Result<f32, SensorError> {
        let (r, g, b) = self.unsaturated()?.without_ir();
        let cpl = self.integration_time_ms() * self.gain.factor() / (GLASS_ATTENUATION * DEVICE_FACTOR);
        Ok(((R_COEF * r + G_COEF * g + B_COEF * b) / cpl).max(0.0))
    }

    /// Correlated color temperature in kelvin
    ///
    /// An all-zero measurement (darkness) reads as 0 K.
    pub fn color_temperature(&mut self) -> Result<f32, SensorError> {
        let raw = self.unsaturated()?;
        if raw.clear == 0 {
            return Ok(0.0);
        }
        let (r, _, b) = raw.without_ir();
        if r <= 0.0 {
            return Err(SensorError::InvalidReading);
        }
        Ok(CT_COEF * b / r + CT_OFFSET)
    }

    fn read_u8(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[COMMAND | reg], &mut buf)
            .map_err(bus_error)?;
        Ok(buf[0])
    }

    fn write_u8(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(ADDRESS, &[COMMAND | reg, value])
            .map_err(bus_error)
    }
}

impl<I2C: I2c> LightSensor for Tcs34725<I2C> {
    fn name(&self) -> &'static str {
        "TCS34725"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[
            Capability::Lux,
            Capability::ColorTemperature,
            Capability::Color,
        ])
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        match capability {
            Capability::Lux => self.illuminance().map(Reading::Value),
            Capability::ColorTemperature => self.color_temperature().map(Reading::Value),
            Capability::Color => Ok(Reading::Rgb(self.raw()?.packed_rgb())),
            _ => Err(SensorError::Unsupported),
        }
    }
}
