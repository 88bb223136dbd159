//! Stall detection over successive sensor readings
//!
//! A stall is a motor that is being driven while the position sensor
//! reports no change across consecutive control ticks: the gearbox is
//! blocked, or the transducer wiring is dead. Either way the motor must
//! not keep pushing.

/// Consecutive-reading stall detector
///
/// Readings are compared with EXACT floating-point equality: on real
/// hardware, ADC noise means a moving axis essentially never produces two
/// bit-identical readings, while a blocked axis does.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StallDetector {
    /// Last reading observed on a running tick
    last_reading: Option<f32>,
    /// Consecutive running ticks whose reading matched `last_reading`
    repeat_count: u8,
}

impl StallDetector {
    /// Create a fresh detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all bookkeeping
    pub fn reset(&mut self) {
        self.last_reading = None;
        self.repeat_count = 0;
    }

    /// Feed one tick's reading; returns true when a stall should be declared
    ///
    /// A reading only counts toward a stall while the motor is running.
    /// The same reading has to persist for two consecutive running ticks
    /// beyond the first before the stall is declared.
    #[allow(clippy::float_cmp)] // exact-match semantics are intentional
    pub fn observe(&mut self, reading: f32, running: bool) -> bool {
        if running && self.last_reading == Some(reading) {
            self.repeat_count = self.repeat_count.saturating_add(1);
            if self.repeat_count > 1 {
                return true;
            }
        } else {
            self.last_reading = Some(reading);
            self.repeat_count = 0;
        }
        false
    }

    /// Number of consecutive repeated readings seen so far
    pub fn repeat_count(&self) -> u8 {
        self.repeat_count
    }
}
