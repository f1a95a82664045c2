//! VEML7700 ambient light sensor
//!
//! 16-bit ambient and white channels behind little-endian word
//! registers at address 0x10. Lux is the ambient count times a
//! resolution that depends on gain and integration time.

use embedded_hal::i2c::I2c;
use luxstat_core::traits::{Capability, CapabilitySet, LightSensor, Reading, SensorError};

use super::bus_error;

/// Fixed I2C address
pub const ADDRESS: u8 = 0x10;

/// Register addresses
pub mod reg {
    /// Gain, integration time and shutdown
    pub const ALS_CONF_0: u8 = 0x00;
    /// Ambient light output
    pub const ALS: u8 = 0x04;
    /// White channel output
    pub const WHITE: u8 = 0x05;
    /// Device ID
    pub const ID: u8 = 0x07;
}

/// Low byte of the ID register
const DEVICE_ID: u8 = 0x81;

const GAIN_SHIFT: u16 = 11;
const IT_SHIFT: u16 = 6;

/// Lux per count at gain 2 and 800 ms
const MAX_RESOLUTION: f32 = 0.0036;

/// Ambient light gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1,
    X2,
    X1_8,
    X1_4,
}

impl Gain {
    const fn bits(self) -> u16 {
        match self {
            Gain::X1 => 0b00,
            Gain::X2 => 0b01,
            Gain::X1_8 => 0b10,
            Gain::X1_4 => 0b11,
        }
    }

    fn factor(self) -> f32 {
        match self {
            Gain::X1 => 1.0,
            Gain::X2 => 2.0,
            Gain::X1_8 => 0.125,
            Gain::X1_4 => 0.25,
        }
    }
}

/// Ambient light integration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrationTime {
    Ms25,
    Ms50,
    Ms100,
    Ms200,
    Ms400,
    Ms800,
}

impl IntegrationTime {
    const fn bits(self) -> u16 {
        match self {
            IntegrationTime::Ms25 => 0b1100,
            IntegrationTime::Ms50 => 0b1000,
            IntegrationTime::Ms100 => 0b0000,
            IntegrationTime::Ms200 => 0b0001,
            IntegrationTime::Ms400 => 0b0010,
            IntegrationTime::Ms800 => 0b0011,
        }
    }

    /// Duration in milliseconds
    pub const fn millis(self) -> u16 {
        match self {
            IntegrationTime::Ms25 => 25,
            IntegrationTime::Ms50 => 50,
            IntegrationTime::Ms100 => 100,
            IntegrationTime::Ms200 => 200,
            IntegrationTime::Ms400 => 400,
            IntegrationTime::Ms800 => 800,
        }
    }
}

/// VEML7700 driver
pub struct Veml7700<I2C> {
    i2c: I2C,
    gain: Gain,
    integration_time: IntegrationTime,
}

impl<I2C: I2c> Veml7700<I2C> {
    /// Verify the chip ID and power it up with the reset defaults
    pub fn new(i2c: I2C) -> Result<Self, SensorError> {
        let mut sensor = Self {
            i2c,
            gain: Gain::X1,
            integration_time: IntegrationTime::Ms100,
        };
        let id = sensor.read_register(reg::ID)?;
        if id & 0xFF != DEVICE_ID as u16 {
            return Err(SensorError::NotDetected);
        }
        sensor.write_config()?;
        Ok(sensor)
    }

    /// Set the ambient gain
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), SensorError> {
        self.gain = gain;
        self.write_config()
    }

    /// Set the integration time
    pub fn set_integration_time(&mut self, time: IntegrationTime) -> Result<(), SensorError> {
        self.integration_time = time;
        self.write_config()
    }

    /// Lux per ambient count at the current settings
    pub fn resolution(&self) -> f32 {
        MAX_RESOLUTION
            * (800.0 / self.integration_time.millis() as f32)
            * (2.0 / self.gain.factor())
    }

    /// Raw ambient light count
    pub fn light(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::ALS)
    }

    /// Raw white channel count
    pub fn white(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::WHITE)
    }

    fn config_word(&self) -> u16 {
        (self.gain.bits() << GAIN_SHIFT) | (self.integration_time.bits() << IT_SHIFT)
    }

    fn write_config(&mut self) -> Result<(), SensorError> {
        self.write_register(reg::ALS_CONF_0, self.config_word())
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(ADDRESS, &[reg], &mut buf)
            .map_err(bus_error)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), SensorError> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c.write(ADDRESS, &[reg, lo, hi]).map_err(bus_error)
    }
}

impl<I2C: I2c> LightSensor for Veml7700<I2C> {
    fn name(&self) -> &'static str {
        "VEML7700"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Lux, Capability::Light, Capability::White])
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        match capability {
            Capability::Lux => {
                let light = self.light()?;
                Ok(Reading::Value(light as f32 * self.resolution()))
            }
            Capability::Light => Ok(Reading::Count(self.light()?.into())),
            Capability::White => Ok(Reading::Count(self.white()?.into())),
            _ => Err(SensorError::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{close_to, FakeI2c};

    const SHUTDOWN: u16 = 0x0001;

    fn chip() -> FakeI2c {
        let mut bus = FakeI2c::words(ADDRESS);
        bus.set_u16(reg::ID, 0xC481);
        bus.set_u16(reg::ALS_CONF_0, SHUTDOWN);
        bus
    }

    #[test]
    fn test_rejects_wrong_id() {
        let mut bus = chip();
        bus.set_u16(reg::ID, 0x0000);
        assert_eq!(Veml7700::new(bus).err(), Some(SensorError::NotDetected));
    }

    #[test]
    fn test_missing_chip_is_bus_error() {
        assert_eq!(Veml7700::new(FakeI2c::empty()).err(), Some(SensorError::Bus));
    }

    #[test]
    fn test_new_powers_up() {
        let sensor = Veml7700::new(chip()).unwrap();
        let bus = sensor.i2c;
        assert_eq!(bus.u16_at(reg::ALS_CONF_0) & SHUTDOWN, 0);
    }

    #[test]
    fn test_configure_writes_gain_and_time() {
        let mut sensor = Veml7700::new(chip()).unwrap();
        sensor.set_gain(Gain::X1_4).unwrap();
        sensor.set_integration_time(IntegrationTime::Ms400).unwrap();
        assert_eq!(sensor.i2c.u16_at(reg::ALS_CONF_0), (0b11 << 11) | (0b0010 << 6));
    }

    #[test]
    fn test_lux_scales_with_settings() {
        let mut sensor = Veml7700::new(chip()).unwrap();
        sensor.set_gain(Gain::X1_4).unwrap();
        sensor.set_integration_time(IntegrationTime::Ms400).unwrap();
        sensor.i2c.set_u16(reg::ALS, 1000);
        sensor.i2c.set_u16(reg::WHITE, 1500);

        // 0.0036 * 2 * 8 = 0.0576 lux per count
        let lux = sensor.lux().unwrap();
        assert!(close_to(lux, 57.6, 0.01));
        assert_eq!(sensor.read(Capability::Light), Ok(Reading::Count(1000)));
        assert_eq!(sensor.read(Capability::White), Ok(Reading::Count(1500)));
        assert_eq!(sensor.read(Capability::Infrared), Err(SensorError::Unsupported));
    }
}
