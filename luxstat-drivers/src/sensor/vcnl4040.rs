//! VCNL4040 proximity and ambient light sensor
//!
//! Word registers at address 0x60. Each register holds two
//! configuration bytes (low byte first).

use embedded_hal::i2c::I2c;
use luxstat_core::traits::{Capability, CapabilitySet, LightSensor, Reading, SensorError};

use super::bus_error;

/// Fixed I2C address
pub const ADDRESS: u8 = 0x60;

/// Register addresses
pub mod reg {
    /// ALS integration time and shutdown
    pub const ALS_CONF: u8 = 0x00;
    /// PS_CONF1 (low) and PS_CONF2 (high)
    pub const PS_CONF1_2: u8 = 0x03;
    /// PS_CONF3 (low) and PS_MS (high, white channel enable)
    pub const PS_CONF3_MS: u8 = 0x04;
    pub const PS_DATA: u8 = 0x08;
    pub const ALS_DATA: u8 = 0x09;
    pub const WHITE_DATA: u8 = 0x0A;
    pub const ID: u8 = 0x0C;
}

const DEVICE_ID: u16 = 0x0186;

const PS_SD: u16 = 0x0001;
/// WHITE_EN in PS_MS; the channel runs while this is clear
const WHITE_SD: u16 = 0x8000;
const ALS_IT_SHIFT: u16 = 6;

/// Lux per count at 80 ms
const BASE_RESOLUTION: f32 = 0.1;

/// Ambient light integration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlsIntegrationTime {
    Ms80,
    Ms160,
    Ms320,
    Ms640,
}

impl AlsIntegrationTime {
    const fn bits(self) -> u16 {
        self as u16
    }
}

/// VCNL4040 driver
pub struct Vcnl4040<I2C> {
    i2c: I2C,
    als_integration_time: AlsIntegrationTime,
}

impl<I2C: I2c> Vcnl4040<I2C> {
    /// Verify the chip ID and enable proximity, ambient and white
    pub fn new(i2c: I2C) -> Result<Self, SensorError> {
        let mut sensor = Self {
            i2c,
            als_integration_time: AlsIntegrationTime::Ms80,
        };
        if sensor.read_register(reg::ID)? != DEVICE_ID {
            return Err(SensorError::NotDetected);
        }

        let ps = sensor.read_register(reg::PS_CONF1_2)?;
        sensor.write_register(reg::PS_CONF1_2, ps & !PS_SD)?;
        let ms = sensor.read_register(reg::PS_CONF3_MS)?;
        sensor.write_register(reg::PS_CONF3_MS, ms & !WHITE_SD)?;
        sensor.write_als_config()?;
        Ok(sensor)
    }

    pub fn set_als_integration_time(&mut self, time: AlsIntegrationTime) -> Result<(), SensorError> {
        self.als_integration_time = time;
        self.write_als_config()
    }

    /// Lux per ambient count at the current integration time
    pub fn resolution(&self) -> f32 {
        BASE_RESOLUTION / (1u16 << self.als_integration_time.bits()) as f32
    }

    pub fn proximity(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::PS_DATA)
    }

    pub fn light(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::ALS_DATA)
    }

    pub fn white(&mut self) -> Result<u16, SensorError> {
        self.read_register(reg::WHITE_DATA)
    }

    fn write_als_config(&mut self) -> Result<(), SensorError> {
        // ALS_SD cleared
        let conf = self.als_integration_time.bits() << ALS_IT_SHIFT;
        self.write_register(reg::ALS_CONF, conf)
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

impl<I2C: I2c> LightSensor for Vcnl4040<I2C> {
    fn name(&self) -> &'static str {
        "VCNL4040"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[
            Capability::Lux,
            Capability::Light,
            Capability::White,
            Capability::Proximity,
        ])
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        match capability {
            Capability::Lux => Ok(Reading::Value(self.light()? as f32 * self.resolution())),
            Capability::Light => Ok(Reading::Count(self.light()?.into())),
            Capability::White => Ok(Reading::Count(self.white()?.into())),
            Capability::Proximity => Ok(Reading::Count(self.proximity()?.into())),
            _ => Err(SensorError::Unsupported),
        }
    }
}
