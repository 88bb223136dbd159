//! H-bridge DC motor driver
//!
//! Two GPIO outputs select the bridge legs: one high and one low drives the
//! motor in the corresponding direction, both low coasts it. Both pins high
//! would short the bridge, so the driver only ever raises one at a time.

use embedded_hal::digital::OutputPin;
use fenestra_core::config::Percent;
use fenestra_core::traits::{Direction, MotorDriver};

/// DC motor behind an H-bridge, driven through two direction pins
///
/// The drive power is recorded at construction; applying it as a PWM duty
/// cycle on the bridge enable pin is the board bring-up's job.
pub struct HBridgeMotor<A, B> {
    pin_a: A,
    pin_b: B,
    power: Percent,
    running: bool,
}

impl<A: OutputPin, B: OutputPin> HBridgeMotor<A, B> {
    /// Create a driver and force both bridge legs low
    ///
    /// Pin A raised drives toward increasing position, pin B raised toward
    /// decreasing.
    pub fn new(pin_a: A, pin_b: B, power: Percent) -> Self {
        let mut motor = Self {
            pin_a,
            pin_b,
            power,
            running: false,
        };
        motor.stop();
        motor
    }

    /// Configured drive power
    pub fn power(&self) -> Percent {
        self.power
    }
}

impl<A: OutputPin, B: OutputPin> MotorDriver for HBridgeMotor<A, B> {
    fn drive(&mut self, dir: Direction) {
        // Lower the opposite leg before raising the active one
        match dir {
            Direction::Increasing => {
                self.pin_b.set_low().ok();
                self.pin_a.set_high().ok();
            }
            Direction::Decreasing => {
                self.pin_a.set_low().ok();
                self.pin_b.set_high().ok();
            }
        }
        self.running = true;
    }

    fn stop(&mut self) {
        self.pin_a.set_low().ok();
        self.pin_b.set_low().ok();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
