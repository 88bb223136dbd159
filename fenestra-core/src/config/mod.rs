//! Configuration types
//!
//! Board-agnostic configuration structures, explicitly constructed at
//! startup. Values that carry invariants go through checked factories.

pub mod calibration;
pub mod types;

pub use calibration::TravelCalibration;
pub use types::{BrokerConfig, ConfigError, DeviceConfig, Percent, MAX_HOST_LEN, MAX_NAME_LEN};
