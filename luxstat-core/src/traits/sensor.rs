//! Light sensor trait and capability model

use core::fmt;

/// Errors that can occur with light sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed (NACK, arbitration loss, ...)
    Bus,
    /// Something answered, but it is not the expected chip
    NotDetected,
    /// The chip has no such reading
    Unsupported,
    /// Channel overflowed at the current gain/integration time
    Saturated,
    /// Raw values cannot be converted (e.g. division by a zero channel)
    InvalidReading,
}

/// A named reading a sensor chip may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability {
    /// Illuminance in lux
    Lux,
    /// Infrared channel
    Infrared,
    /// Correlated color temperature in kelvin
    ColorTemperature,
    /// White channel
    White,
    /// Proximity counts
    Proximity,
    /// Broadband (visible + infrared) channel
    Broadband,
    /// Packed 0xRRGGBB color
    Color,
    /// Raw ambient light channel
    Light,
}

impl Capability {
    /// Every capability, in declaration order
    pub const ALL: [Capability; 8] = [
        Capability::Lux,
        Capability::Infrared,
        Capability::ColorTemperature,
        Capability::White,
        Capability::Proximity,
        Capability::Broadband,
        Capability::Color,
        Capability::Light,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of capabilities a sensor exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// No capabilities
    pub const EMPTY: Self = Self(0);

    /// Build a set from a list
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < capabilities.len() {
            bits |= capabilities[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Check membership
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Set with `capability` added
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Number of capabilities in the set
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Check if the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate in declaration order
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// A single sensor reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Derived physical quantity (lux, kelvin)
    Value(f32),
    /// Raw channel counts
    Count(u32),
    /// Packed 0xRRGGBB color
    Rgb(u32),
}

impl Reading {
    /// Numeric value of the reading
    pub fn as_f32(self) -> f32 {
        match self {
            Reading::Value(v) => v,
            Reading::Count(c) | Reading::Rgb(c) => c as f32,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{:.1}", v),
            Reading::Count(c) => write!(f, "{}", c),
            Reading::Rgb(rgb) => write!(f, "{:#x}", rgb),
        }
    }
}

/// Trait for light/proximity sensors
///
/// Implementations wrap exactly one chip. A missing capability is not a
/// fault: [`LightSensor::read`] returns [`SensorError::Unsupported`] and
/// [`LightSensor::capabilities`] reports the absence up front.
///
/// Takes `&mut self` because every read is a bus transaction.
pub trait LightSensor {
    /// Chip name for logs
    fn name(&self) -> &'static str;

    /// Readings this chip can produce
    fn capabilities(&self) -> CapabilitySet;

    /// Read one capability
    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError>;

    /// Read illuminance in lux
    fn lux(&mut self) -> Result<f32, SensorError> {
        self.read(Capability::Lux).map(Reading::as_f32)
    }

    /// Check if the chip exposes `capability`
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

impl<T: LightSensor + ?Sized> LightSensor for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capabilities(&self) -> CapabilitySet {
        (**self).capabilities()
    }

    fn read(&mut self, capability: Capability) -> Result<Reading, SensorError> {
        (**self).read(capability)
    }
}
