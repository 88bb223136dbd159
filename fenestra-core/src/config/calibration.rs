//! Travel sensor calibration
//!
//! The position transducer reports raw ADC counts; calibration maps the
//! mechanically reachable counts range onto the [0, 1] travel fraction.

use super::types::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw counts at the fully closed end of travel (factory default)
const DEFAULT_COUNTS_MIN: u16 = 15_500;

/// Raw counts at the fully open end of travel (factory default)
const DEFAULT_COUNTS_MAX: u16 = 52_800;

/// Linear counts-to-fraction calibration for the travel sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TravelCalibration {
    counts_min: u16,
    counts_max: u16,
}

impl TravelCalibration {
    /// Build a calibration from the counts observed at each end of travel
    ///
    /// `counts_min` must be strictly below `counts_max`.
    pub fn new(counts_min: u16, counts_max: u16) -> Result<Self, ConfigError> {
        if counts_min >= counts_max {
            return Err(ConfigError::DegenerateCalibration);
        }
        Ok(Self { counts_min, counts_max })
    }

    /// Counts at the closed end of travel
    pub fn counts_min(&self) -> u16 {
        self.counts_min
    }

    /// Counts at the open end of travel
    pub fn counts_max(&self) -> u16 {
        self.counts_max
    }

    /// Convert a raw counts reading to a travel fraction
    ///
    /// NOT clamped: readings outside the calibrated range map outside
    /// [0, 1], which is how a detached or miswired transducer shows up
    /// downstream.
    pub fn fraction_from_counts(&self, counts: u16) -> f32 {
        let span = f32::from(self.counts_max - self.counts_min);
        (f32::from(counts) - f32::from(self.counts_min)) / span
    }
}

impl Default for TravelCalibration {
    fn default() -> Self {
        Self {
            counts_min: DEFAULT_COUNTS_MIN,
            counts_max: DEFAULT_COUNTS_MAX,
        }
    }
}
