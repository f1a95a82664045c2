//! TSL2561 light-to-digital converter
//!
//! Broadband (channel 0) and infrared (channel 1) diodes. Lux uses the
//! integer approximation from the datasheet (T/FN/CL package), with the
//! channels normalised to 16x gain and 402 ms first.

use embedded_hal::i2c::I2c;
use luxstat_core::traits::{Capability, CapabilitySet, LightSensor, Reading, SensorError};

use super::bus_error;

/// Default I2C address (ADDR pin floating)
pub const ADDRESS: u8 = 0x39;

const COMMAND: u8 = 0x80;
const WORD: u8 = 0x20;

/// Register addresses
pub mod reg {
    pub const CONTROL: u8 = 0x00;
    pub const TIMING: u8 = 0x01;
    pub const ID: u8 = 0x0A;
    pub const DATA0: u8 = 0x0C;
    pub const DATA1: u8 = 0x0E;
}

const POWER_ON: u8 = 0x03;
const GAIN_16X: u8 = 0x10;

/// TSL2561 part numbers in the ID high nibble
const PART_NUMBERS: [u8; 2] = [0x1, 0x5];

const LUX_SCALE: u32 = 14;
const RATIO_SCALE: u32 = 9;
const CH_SCALE: u32 = 10;
const CH_SCALE_13MS: u64 = 0x7517;
const CH_SCALE_101MS: u64 = 0x0FE7;

/// (ratio ceiling K, coefficient B, coefficient M)
const LUX_TABLE: [(u64, u64, u64); 8] = [
    (0x0040, 0x01F2, 0x01BE),
    (0x0080, 0x0214, 0x02D1),
    (0x00C0, 0x023F, 0x037B),
    (0x0100, 0x0270, 0x03FE),
    (0x0138, 0x016F, 0x01FC),
    (0x019A, 0x00D2, 0x00FB),
    (0x029A, 0x0018, 0x0012),
    (u64::MAX, 0x0000, 0x0000),
];

/// Analog gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1,
    X16,
}

/// Integration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrationTime {
    Ms13,
    Ms101,
    Ms402,
}

impl IntegrationTime {
    const fn bits(self) -> u8 {
        self as u8
    }

    /// Count above which a channel is considered clipped
    const fn clip_threshold(self) -> u16 {
        match self {
            IntegrationTime::Ms13 => 4900,
            IntegrationTime::Ms101 => 37000,
            IntegrationTime::Ms402 => 65000,
        }
    }
}

/// Integer lux from raw channels
pub fn calculate_lux(broadband: u16, infrared: u16, gain: Gain, time: IntegrationTime) -> u32 {
    let mut ch_scale = match time {
        IntegrationTime::Ms13 => CH_SCALE_13MS,
        IntegrationTime::Ms101 => CH_SCALE_101MS,
        IntegrationTime::Ms402 => 1 << CH_SCALE,
    };
    if gain == Gain::X1 {
        ch_scale <<= 4;
    }

    let channel0 = (u64::from(broadband) * ch_scale) >> CH_SCALE;
    let channel1 = (u64::from(infrared) * ch_scale) >> CH_SCALE;

    let ratio = if channel0 == 0 {
        0
    } else {
        (((channel1 << (RATIO_SCALE + 1)) / channel0) + 1) >> 1
    };

    let (_, b, m) = LUX_TABLE
        .iter()
        .copied()
        .find(|&(k, _, _)| ratio <= k)
        .unwrap_or(LUX_TABLE[LUX_TABLE.len() - 1]);

    let temp = (channel0 * b).saturating_sub(channel1 * m);
    ((temp + (1 << (LUX_SCALE - 1))) >> LUX_SCALE) as u32
}

/// TSL2561 driver
pub struct Tsl2561<I2C> {
    i2c: I2C,
    gain: Gain,
    integration_time: IntegrationTime,
}

impl<I2C: I2c> Tsl2561<I2C> {
    /// Verify the part number and power up
    pub fn new(i2c: I2C) -> Result<Self, SensorError> {
        let mut sensor = Self {
            i2c,
            gain: Gain::X1,
            integration_time: IntegrationTime::Ms402,
        };
        let id = sensor.read_u8(reg::ID)?;
        if !PART_NUMBERS.contains(&(id >> 4)) {
            return Err(SensorError::NotDetected);
        }
        sensor.write_u8(reg::CONTROL, POWER_ON)?;
        Ok(sensor)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), SensorError> {
        self.gain = gain;
        self.write_timing()
    }

    pub fn set_integration_time(&mut self, time: IntegrationTime) -> Result<(), SensorError> {
        self.integration_time = time;
        self.write_timing()
    }

    /// Broadband channel count
    pub fn broadband(&mut self) -> Result<u16, SensorError> {
        self.read_u16(reg::DATA0)
    }

    /// Infrared channel count
    pub fn infrared(&mut self) -> Result<u16, SensorError> {
        self.read_u16(reg::DATA1)
    }

    /// Illuminance; fails when either channel is clipped
    pub fn illuminance(&mut self) -> Result<u32, SensorError> {
        let broadband = self.broadband()?;
        let infrared = self.infrared()?;
        let clip = self.integration_time.clip_threshold();
        if broadband > clip || infrared > clip {
            return Err(SensorError::Saturated);
        }
        Ok(calculate_lux(
            broadband,
            infrared,
            self.gain,
            self.integration_time,
        ))
    }

    fn write_timing(&mut self) -> Result<(), SensorError> {
        let gain = match self.gain {
            Gain::X1 => 0,
            Gain::X16 => GAIN_16X,
        };
        self.write_u8(reg::TIMING, gain | self.integration_time.bits())
    }

    fn read_u8(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[COMMAND | reg], &mut buf)
            .map_err(bus_error)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(ADDRESS, &[COMMAND | WORD | reg], &mut buf)
            .map_err(bus_error)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn write_u8(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(ADDRESS, &[COMMAND | reg, value])
            .map_err(bus_error)
    }
}

impl<I2C: I2c> LightSensor for Tsl2561<I2C> {
    fn name(&self) -> &'static str {
        "TSL2561"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Lux, Capability::Infrared, Capability::Broadband])
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        match capability {
            Capability::Lux => Ok(Reading::Value(self.illuminance()? as f32)),
            Capability::Infrared => Ok(Reading::Count(self.infrared()?.into())),
            Capability::Broadband => Ok(Reading::Count(self.broadband()?.into())),
            _ => Err(SensorError::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeI2c;
    use proptest::prelude::*;

    fn chip() -> FakeI2c {
        let mut bus = FakeI2c::command(ADDRESS, 0x0F);
        bus.set_u8(reg::ID, 0x50);
        bus
    }

    #[test]
    fn test_new_checks_part_number() {
        let mut bus = chip();
        bus.set_u8(reg::ID, 0x20);
        assert_eq!(Tsl2561::new(bus).err(), Some(SensorError::NotDetected));

        let mut bus = chip();
        bus.set_u8(reg::ID, 0x1A);
        assert!(Tsl2561::new(bus).is_ok());
    }

    #[test]
    fn test_configure_writes_timing() {
        let mut sensor = Tsl2561::new(chip()).unwrap();
        sensor.set_gain(Gain::X1).unwrap();
        sensor.set_integration_time(IntegrationTime::Ms402).unwrap();
        assert_eq!(sensor.i2c.u8_at(reg::CONTROL), POWER_ON);
        assert_eq!(sensor.i2c.u8_at(reg::TIMING), 0x02);
    }

    #[test]
    fn test_lux_matches_datasheet_approximation() {
        assert_eq!(calculate_lux(1000, 200, Gain::X1, IntegrationTime::Ms402), 379);
        assert_eq!(calculate_lux(0, 0, Gain::X1, IntegrationTime::Ms402), 0);
        // Mostly infrared light reads as dark
        assert_eq!(calculate_lux(1000, 1500, Gain::X1, IntegrationTime::Ms402), 0);
        // 16x gain needs no rescaling
        assert_eq!(calculate_lux(16000, 3200, Gain::X16, IntegrationTime::Ms402), 379);
    }

    #[test]
    fn test_readings() {
        let mut sensor = Tsl2561::new(chip()).unwrap();
        sensor.i2c.set_u16(reg::DATA0, 1000);
        sensor.i2c.set_u16(reg::DATA1, 200);

        assert_eq!(sensor.read(Capability::Lux), Ok(Reading::Value(379.0)));
        assert_eq!(sensor.read(Capability::Broadband), Ok(Reading::Count(1000)));
        assert_eq!(sensor.read(Capability::Infrared), Ok(Reading::Count(200)));
        assert_eq!(sensor.read(Capability::Proximity), Err(SensorError::Unsupported));
    }

    #[test]
    fn test_clipped_channel_is_saturated() {
        let mut sensor = Tsl2561::new(chip()).unwrap();
        sensor.i2c.set_u16(reg::DATA0, 65535);
        assert_eq!(sensor.read(Capability::Lux), Err(SensorError::Saturated));
    }

    proptest! {
        #[test]
        fn prop_infrared_never_adds_lux(broadband in 0u16..=65000, infrared in 0u16..=65000) {
            let t = IntegrationTime::Ms402;
            prop_assert!(
                calculate_lux(broadband, infrared, Gain::X1, t) <= calculate_lux(broadband, 0, Gain::X1, t)
            );
        }
    }
}
