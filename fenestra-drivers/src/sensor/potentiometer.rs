//! Potentiometer travel sensor
//!
//! A multi-turn potentiometer geared to the actuator spindle, read through
//! an ADC and mapped to the [0, 1] travel fraction by the configured
//! calibration.

use fenestra_core::config::TravelCalibration;
use fenestra_core::traits::PositionSensor;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read the raw conversion result
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Travel sensor backed by a potentiometer on an ADC channel
///
/// On a failed conversion the previous reading is returned unchanged.
/// Under a running motor an unchanging reading is exactly what the stall
/// detector watches for, so a dead ADC surfaces as a stall instead of
/// silently feeding garbage into the control loop.
pub struct TravelPotentiometer<ADC> {
    adc: ADC,
    calibration: TravelCalibration,
    last: f32,
}

impl<ADC: AdcReader> TravelPotentiometer<ADC> {
    /// Create a sensor with the given calibration
    pub fn new(adc: ADC, calibration: TravelCalibration) -> Self {
        Self {
            adc,
            calibration,
            last: 0.0,
        }
    }

    /// The calibration in use
    pub fn calibration(&self) -> &TravelCalibration {
        &self.calibration
    }
}

impl<ADC: AdcReader> PositionSensor for TravelPotentiometer<ADC> {
    fn read(&mut self) -> f32 {
        if let Ok(counts) = self.adc.read() {
            self.last = self.calibration.fraction_from_counts(counts);
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dummy ADC for testing (returns a fixed value)
    struct DummyAdc(u16);

    impl AdcReader for DummyAdc {
        fn read(&mut self) -> Result<u16, ()> {
            Ok(self.0)
        }
    }

    /// ADC that always fails
    struct BrokenAdc;

    impl AdcReader for BrokenAdc {
        fn read(&mut self) -> Result<u16, ()> {
            Err(())
        }
    }

    fn calibration() -> TravelCalibration {
        TravelCalibration::new(10_000, 20_000).unwrap()
    }

    fn abs(v: f32) -> f32 {
        if v < 0.0 {
            -v
        } else {
            v
        }
    }

    #[test]
    fn test_counts_convert_through_calibration() {
        let mut sensor = TravelPotentiometer::new(DummyAdc(15_000), calibration());
        let pos = sensor.read();
        assert!(abs(pos - 0.5) < 1e-6);
    }

    #[test]
    fn test_endpoints() {
        let mut low = TravelPotentiometer::new(DummyAdc(10_000), calibration());
        assert_eq!(low.read(), 0.0);
        let mut high = TravelPotentiometer::new(DummyAdc(20_000), calibration());
        assert_eq!(high.read(), 1.0);
    }

    #[test]
    fn test_out_of_range_counts_pass_through_unclamped() {
        let mut sensor = TravelPotentiometer::new(DummyAdc(25_000), calibration());
        assert!(sensor.read() > 1.0);
    }

    #[test]
    fn test_failed_conversion_repeats_last_reading() {
        let mut sensor = TravelPotentiometer::new(BrokenAdc, calibration());
        assert_eq!(sensor.read(), 0.0);

        let mut sensor = TravelPotentiometer {
            adc: BrokenAdc,
            calibration: calibration(),
            last: 0.75,
        };
        assert_eq!(sensor.read(), 0.75);
        assert_eq!(sensor.read(), 0.75);
    }
}
