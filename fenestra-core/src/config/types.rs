//! Configuration type definitions

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum broker hostname length
pub const MAX_HOST_LEN: usize = 64;

/// Maximum name/credential length
pub const MAX_NAME_LEN: usize = 32;

/// Default MQTT broker port
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Errors from configuration validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Percentage above 100
    PercentOutOfRange,
    /// Calibration with an empty or inverted counts range
    DegenerateCalibration,
}

/// A whole percentage in [0, 100]
///
/// The checked factory is the only way to build one, so a `Percent` held
/// anywhere is known valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Percent(u8);

impl Percent {
    /// Full scale
    pub const MAX: Percent = Percent(100);

    /// Validate and wrap a raw percentage
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        if value > 100 {
            return Err(ConfigError::PercentOutOfRange);
        }
        Ok(Self(value))
    }

    /// Raw percentage value
    pub fn get(self) -> u8 {
        self.0
    }

    /// Value as a fraction in [0, 1]
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::MAX
    }
}

/// Broker connection settings
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrokerConfig {
    /// Broker hostname or address
    pub host: String<MAX_HOST_LEN>,
    /// Broker port
    pub port: u16,
    /// Username; empty for anonymous access
    pub username: String<MAX_NAME_LEN>,
    /// Password; empty for anonymous access
    pub password: String<MAX_NAME_LEN>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_BROKER_PORT,
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Per-device settings
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Display name
    pub name: String<MAX_NAME_LEN>,
    /// Hardware model string
    pub model: String<MAX_NAME_LEN>,
    /// Manufacturer string
    pub manufacturer: String<MAX_NAME_LEN>,
    /// Motor drive power
    pub motor_power: Percent,
    /// Travel sensor calibration
    pub calibration: super::TravelCalibration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: String::new(),
            manufacturer: String::new(),
            motor_power: Percent::MAX,
            calibration: super::TravelCalibration::default(),
        }
    }
}
