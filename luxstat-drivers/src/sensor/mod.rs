//! Light sensor drivers and the probe chain
//!
//! Every supported chip is wrapped in [`AnySensor`] so the probe chain
//! has a single output type. The chain order is the selection priority.

pub mod tcs34725;
pub mod tsl2561;
pub mod tsl2591;
pub mod vcnl4040;
pub mod veml7700;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use luxstat_core::sensor::Candidate;
use luxstat_core::traits::{Capability, CapabilitySet, LightSensor, Reading, SensorError};

pub use tcs34725::Tcs34725;
pub use tsl2561::Tsl2561;
pub use tsl2591::Tsl2591;
pub use vcnl4040::Vcnl4040;
pub use veml7700::Veml7700;

/// Collapse any bus error into [`SensorError::Bus`]
pub(crate) fn bus_error<E: embedded_hal::i2c::Error>(_: E) -> SensorError {
    SensorError::Bus
}

/// Whichever sensor the probe selected
pub enum AnySensor<I2C> {
    Veml7700(Veml7700<I2C>),
    Tsl2591(Tsl2591<I2C>),
    Tsl2561(Tsl2561<I2C>),
    Tcs34725(Tcs34725<I2C>),
    Vcnl4040(Vcnl4040<I2C>),
}

impl<I2C: I2c> AnySensor<I2C> {
    /// Bring the selected chip to its first valid measurement
    ///
    /// Call once after probing. Only the TCS34725 has work to do here;
    /// the other chips start converting as soon as they are configured.
    pub fn start<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), SensorError> {
        match self {
            AnySensor::Tcs34725(s) => s.start(delay),
            _ => Ok(()),
        }
    }
}

impl<I2C: I2c> LightSensor for AnySensor<I2C> {
    fn name(&self) -> &'static str {
        match self {
            AnySensor::Veml7700(s) => s.name(),
            AnySensor::Tsl2591(s) => s.name(),
            AnySensor::Tsl2561(s) => s.name(),
            AnySensor::Tcs34725(s) => s.name(),
            AnySensor::Vcnl4040(s) => s.name(),
        }
    }

    fn capabilities(&self) -> CapabilitySet {
        match self {
            AnySensor::Veml7700(s) => s.capabilities(),
            AnySensor::Tsl2591(s) => s.capabilities(),
            AnySensor::Tsl2561(s) => s.capabilities(),
            AnySensor::Tcs34725(s) => s.capabilities(),
            AnySensor::Vcnl4040(s) => s.capabilities(),
        }
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        match self {
            AnySensor::Veml7700(s) => s.read(capability),
            AnySensor::Tsl2591(s) => s.read(capability),
            AnySensor::Tsl2561(s) => s.read(capability),
            AnySensor::Tcs34725(s) => s.read(capability),
            AnySensor::Vcnl4040(s) => s.read(capability),
        }
    }
}

fn construct_veml7700<I2C: I2c>(i2c: I2C) -> Result<AnySensor<I2C>, SensorError> {
    Veml7700::new(i2c).map(AnySensor::Veml7700)
}

fn configure_veml7700<I2C: I2c>(sensor: &mut AnySensor<I2C>) -> Result<(), SensorError> {
    let AnySensor::Veml7700(sensor) = sensor else {
        return Err(SensorError::NotDetected);
    };
    sensor.set_gain(veml7700::Gain::X1_4)?;
    sensor.set_integration_time(veml7700::IntegrationTime::Ms400)
}

fn construct_tsl2591<I2C: I2c>(i2c: I2C) -> Result<AnySensor<I2C>, SensorError> {
    Tsl2591::new(i2c).map(AnySensor::Tsl2591)
}

fn configure_tsl2591<I2C: I2c>(sensor: &mut AnySensor<I2C>) -> Result<(), SensorError> {
    let AnySensor::Tsl2591(sensor) = sensor else {
        return Err(SensorError::NotDetected);
    };
    sensor.set_gain(tsl2591::Gain::Low)?;
    sensor.set_integration_time(tsl2591::IntegrationTime::Ms400)
}

fn construct_tsl2561<I2C: I2c>(i2c: I2C) -> Result<AnySensor<I2C>, SensorError> {
    Tsl2561::new(i2c).map(AnySensor::Tsl2561)
}

fn configure_tsl2561<I2C: I2c>(sensor: &mut AnySensor<I2C>) -> Result<(), SensorError> {
    let AnySensor::Tsl2561(sensor) = sensor else {
        return Err(SensorError::NotDetected);
    };
    sensor.set_gain(tsl2561::Gain::X1)?;
    sensor.set_integration_time(tsl2561::IntegrationTime::Ms402)
}

fn construct_tcs34725<I2C: I2c>(i2c: I2C) -> Result<AnySensor<I2C>, SensorError> {
    Tcs34725::new(i2c).map(AnySensor::Tcs34725)
}

fn configure_tcs34725<I2C: I2c>(sensor: &mut AnySensor<I2C>) -> Result<(), SensorError> {
    let AnySensor::Tcs34725(sensor) = sensor else {
        return Err(SensorError::NotDetected);
    };
    sensor.set_gain(tcs34725::Gain::X1)?;
    sensor.set_integration_time_ms(400.0)
}

fn construct_vcnl4040<I2C: I2c>(i2c: I2C) -> Result<AnySensor<I2C>, SensorError> {
    Vcnl4040::new(i2c).map(AnySensor::Vcnl4040)
}

fn configure_vcnl4040<I2C: I2c>(sensor: &mut AnySensor<I2C>) -> Result<(), SensorError> {
    let AnySensor::Vcnl4040(sensor) = sensor else {
        return Err(SensorError::NotDetected);
    };
    sensor.set_als_integration_time(vcnl4040::AlsIntegrationTime::Ms320)
}

/// Number of chips in [`probe_chain`]
pub const CHAIN_LEN: usize = 5;

/// Supported chips, highest priority first
pub fn probe_chain<I2C: I2c>() -> [Candidate<I2C, AnySensor<I2C>>; CHAIN_LEN] {
    [
        Candidate {
            name: "VEML7700",
            construct: construct_veml7700::<I2C>,
            configure: configure_veml7700::<I2C>,
        },
        Candidate {
            name: "TSL2591",
            construct: construct_tsl2591::<I2C>,
            configure: configure_tsl2591::<I2C>,
        },
        Candidate {
            name: "TSL2561",
            construct: construct_tsl2561::<I2C>,
            configure: configure_tsl2561::<I2C>,
        },
        Candidate {
            name: "TCS34725",
            construct: construct_tcs34725::<I2C>,
            configure: configure_tcs34725::<I2C>,
        },
        Candidate {
            name: "VCNL4040",
            construct: construct_vcnl4040::<I2C>,
            configure: configure_vcnl4040::<I2C>,
        },
    ]
}
