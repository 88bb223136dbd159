//! Tolerance-band position controller
//!
//! One `tick` per scheduler iteration: check for stall, compare the sensor
//! reading against the target, and start/stop the motor accordingly. The
//! controller never moves the motor outside of `tick` - setting a target
//! only takes effect on the next control step.

use crate::control::stall::StallDetector;
use crate::traits::{Direction, MotorDriver, PositionSensor, StatusIndicator};

/// Acceptable position error radius around the target while stopped,
/// as a fraction of full travel (1.5%).
///
/// While the motor is running a band a third this wide is used instead:
/// stopping early and re-checking beats overshooting, and the wide band
/// would otherwise stop the motor prematurely at the boundary. While
/// stopped the full band absorbs sensor noise around the setpoint.
pub const BASE_TOLERANCE: f32 = 0.015;

/// Errors from controller commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Requested target falls outside [0, 1]
    TargetOutOfRange,
}

/// Closed-loop position controller with stall detection
///
/// Owns the motor, the travel sensor and the status indicator. The
/// indicator is held on while driving and blinked once per tick while
/// stalled.
#[derive(Debug)]
pub struct PositionController<M, S, L> {
    motor: M,
    sensor: S,
    indicator: L,
    /// Active target fraction; `None` while idle
    target: Option<f32>,
    stall: StallDetector,
    stalled: bool,
}

impl<M, S, L> PositionController<M, S, L>
where
    M: MotorDriver,
    S: PositionSensor,
    L: StatusIndicator,
{
    /// Create a controller around the given hardware
    pub fn new(motor: M, sensor: S, indicator: L) -> Self {
        Self {
            motor,
            sensor,
            indicator,
            target: None,
            stall: StallDetector::new(),
            stalled: false,
        }
    }

    /// Command a new target position
    ///
    /// Clears any previous stall condition. The motor does not move until
    /// the next `tick`.
    pub fn set_target(&mut self, target: f32) -> Result<(), ControlError> {
        if !(0.0..=1.0).contains(&target) {
            return Err(ControlError::TargetOutOfRange);
        }
        self.target = Some(target);
        self.clear_stall();
        Ok(())
    }

    /// Stop any movement and clear the target
    ///
    /// With `preserve_stall` the stall flag and its bookkeeping survive;
    /// this is how a detected stall stops the motor without erasing the
    /// condition it is reporting.
    pub fn stop(&mut self, preserve_stall: bool) {
        self.target = None;
        self.motor.stop();
        if !preserve_stall {
            self.clear_stall();
        }
        self.indicator.set_on(false);
    }

    /// Advance one control step
    pub fn tick(&mut self) {
        if self.stalled {
            self.indicator.toggle();
        }

        let Some(target) = self.target else {
            return;
        };

        let cur = self.sensor.read();

        if self.stall.observe(cur, self.motor.is_running()) {
            self.stalled = true;
            self.stop(true);
            return;
        }

        let error = cur - target;

        // Narrow band in motion, wide band at rest
        let tolerance = if self.motor.is_running() {
            BASE_TOLERANCE / 3.0
        } else {
            BASE_TOLERANCE
        };

        if abs(error) < tolerance {
            // Within band: idle the motor but keep the target, so later
            // drift outside the band restarts the move.
            self.motor.stop();
            self.indicator.set_on(false);
        } else if error > 0.0 {
            self.drive(Direction::Decreasing);
        } else {
            self.drive(Direction::Increasing);
        }
    }

    /// Current position, clamped to [0, 1] regardless of raw sensor range
    pub fn position(&mut self) -> f32 {
        self.sensor.read().clamp(0.0, 1.0)
    }

    /// Check if the motor is currently being driven
    pub fn is_running(&self) -> bool {
        self.motor.is_running()
    }

    /// Check if a stall has been declared and not yet cleared
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// The active target, if any
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    fn drive(&mut self, dir: Direction) {
        self.motor.drive(dir);
        self.indicator.set_on(true);
    }

    #[cfg(test)]
    pub(crate) fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    fn clear_stall(&mut self) {
        self.stall.reset();
        self.stalled = false;
        self.indicator.set_on(false);
    }
}

fn abs(v: f32) -> f32 {
    if v < 0.0 {
        -v
    } else {
        v
    }
}
