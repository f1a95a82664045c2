//! TSL2591 high dynamic range light sensor
//!
//! Full-spectrum (channel 0) and infrared (channel 1) photodiodes.
//! Every register access goes through a command byte.

use embedded_hal::i2c::I2c;
use luxstat_core::traits::{Capability, CapabilitySet, LightSensor, Reading, SensorError};

use super::bus_error;

/// Fixed I2C address (shared with the TCS34725)
pub const ADDRESS: u8 = 0x29;

/// Command bit plus normal-operation transaction type
const COMMAND: u8 = 0xA0;

/// Register addresses
pub mod reg {
    pub const ENABLE: u8 = 0x00;
    /// Gain and integration time
    pub const CONTROL: u8 = 0x01;
    pub const ID: u8 = 0x12;
    /// Channel 0 low byte; channel 1 follows at 0x16
    pub const C0DATAL: u8 = 0x14;
}

const DEVICE_ID: u8 = 0x50;

const ENABLE_PON: u8 = 0x01;
const ENABLE_AEN: u8 = 0x02;

/// Device factor for the lux estimate
const LUX_DF: f32 = 408.0;

/// Analog gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// 1x
    Low,
    /// 25x
    Medium,
    /// 428x
    High,
    /// 9876x
    Max,
}

impl Gain {
    const fn bits(self) -> u8 {
        match self {
            Gain::Low => 0x00,
            Gain::Medium => 0x10,
            Gain::High => 0x20,
            Gain::Max => 0x30,
        }
    }

    fn factor(self) -> f32 {
        match self {
            Gain::Low => 1.0,
            Gain::Medium => 25.0,
            Gain::High => 428.0,
            Gain::Max => 9876.0,
        }
    }
}

/// ADC integration time, 100 ms to 600 ms in 100 ms steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrationTime {
    Ms100,
    Ms200,
    Ms300,
    Ms400,
    Ms500,
    Ms600,
}

impl IntegrationTime {
    const fn bits(self) -> u8 {
        self as u8
    }

    /// Duration in milliseconds
    pub const fn millis(self) -> u16 {
        (self as u16 + 1) * 100
    }

    /// Highest count a channel can reach
    const fn max_count(self) -> u16 {
        match self {
            IntegrationTime::Ms100 => 36863,
            _ => 0xFFFF,
        }
    }
}

/// TSL2591 driver
pub struct Tsl2591<I2C> {
    i2c: I2C,
    gain: Gain,
    integration_time: IntegrationTime,
}

impl<I2C: I2c> Tsl2591<I2C> {
    /// Verify the chip ID and enable the ALS
    pub fn new(i2c: I2C) -> Result<Self, SensorError> {
        let mut sensor = Self {
            i2c,
            gain: Gain::Medium,
            integration_time: IntegrationTime::Ms100,
        };
        if sensor.read_u8(reg::ID)? != DEVICE_ID {
            return Err(SensorError::NotDetected);
        }
        sensor.write_control()?;
        sensor.write_u8(reg::ENABLE, ENABLE_PON | ENABLE_AEN)?;
        Ok(sensor)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), SensorError> {
        self.gain = gain;
        self.write_control()
    }

    pub fn set_integration_time(&mut self, time: IntegrationTime) -> Result<(), SensorError> {
        self.integration_time = time;
        self.write_control()
    }

    /// Raw (full spectrum, infrared) counts
    pub fn channels(&mut self) -> Result<(u16, u16), SensorError> {
        let mut buf = [0u8; 4];
        self.i2c
            .write_read(ADDRESS, &[COMMAND | reg::C0DATAL], &mut buf)
            .map_err(bus_error)?;
        Ok((
            u16::from_le_bytes([buf[0], buf[1]]),
            u16::from_le_bytes([buf[2], buf[3]]),
        ))
    }

    /// Illuminance from both channels
    pub fn illuminance(&mut self) -> Result<f32, SensorError> {
        let (full, ir) = self.channels()?;
        let max = self.integration_time.max_count();
        if full >= max || ir >= max {
            return Err(SensorError::Saturated);
        }
        if full == 0 {
            return Ok(0.0);
        }

        let full = full as f32;
        let ir = ir as f32;
        let cpl = self.integration_time.millis() as f32 * self.gain.factor() / LUX_DF;
        Ok(((full - ir) * (1.0 - ir / full) / cpl).max(0.0))
    }

    fn write_control(&mut self) -> Result<(), SensorError> {
        self.write_u8(
            reg::CONTROL,
            self.gain.bits() | self.integration_time.bits(),
        )
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

impl<I2C: I2c> LightSensor for Tsl2591<I2C> {
    fn name(&self) -> &'static str {
        "TSL2591"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Lux, Capability::Infrared])
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        match capability {
            Capability::Lux => self.illuminance().map(Reading::Value),
            Capability::Infrared => Ok(Reading::Count(self.channels()?.1.into())),
            _ => Err(SensorError::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{close_to, FakeI2c};

    fn chip() -> FakeI2c {
        let mut bus = FakeI2c::command(ADDRESS, 0x1F);
        bus.set_u8(reg::ID, DEVICE_ID);
        bus
    }

    fn configured() -> Tsl2591<FakeI2c> {
        let mut sensor = Tsl2591::new(chip()).unwrap();
        sensor.set_gain(Gain::Low).unwrap();
        sensor.set_integration_time(IntegrationTime::Ms400).unwrap();
        sensor
    }

    fn set_channels(sensor: &mut Tsl2591<FakeI2c>, full: u16, ir: u16) {
        sensor.i2c.set_u16(reg::C0DATAL, full);
        sensor.i2c.set_u16(reg::C0DATAL + 2, ir);
    }

    #[test]
    fn test_tcs34725_at_same_address_is_rejected() {
        let mut bus = chip();
        bus.set_u8(reg::ID, 0x44);
        assert_eq!(Tsl2591::new(bus).err(), Some(SensorError::NotDetected));
    }

    #[test]
    fn test_new_enables_and_configure_writes_control() {
        let sensor = configured();
        assert_eq!(sensor.i2c.u8_at(reg::ENABLE), ENABLE_PON | ENABLE_AEN);
        assert_eq!(sensor.i2c.u8_at(reg::CONTROL), 0x03);
    }

    #[test]
    fn test_lux_from_channels() {
        let mut sensor = configured();
        set_channels(&mut sensor, 2000, 400);
        // cpl = 400 * 1 / 408; (1600 * 0.8) / cpl
        let lux = LightSensor::lux(&mut sensor).unwrap();
        assert!(close_to(lux, 1305.6, 0.1));
        assert_eq!(sensor.read(Capability::Infrared), Ok(Reading::Count(400)));
    }

    #[test]
    fn test_dark_reads_zero() {
        let mut sensor = configured();
        set_channels(&mut sensor, 0, 0);
        assert_eq!(LightSensor::lux(&mut sensor), Ok(0.0));
    }

    #[test]
    fn test_overflow_is_saturated() {
        let mut sensor = configured();
        set_channels(&mut sensor, 0xFFFF, 100);
        assert_eq!(LightSensor::lux(&mut sensor), Err(SensorError::Saturated));
        // The IR channel alone is still readable
        assert_eq!(sensor.read(Capability::Infrared), Ok(Reading::Count(100)));
    }
}
