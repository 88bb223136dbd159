//! Motor driver trait
//!
//! The actuator motor is a fixed-power, directional on/off device: an
//! H-bridge driven DC gearmotor with no speed control. Direction names
//! follow the position sensor axis, not a physical rotation sense - which
//! wire pair maps to "increasing" is fixed by the installation.

/// Drive direction along the travel axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Drive toward larger sensor readings (more open)
    Increasing,
    /// Drive toward smaller sensor readings (more closed)
    Decreasing,
}

/// Trait for directional on/off motor drivers
pub trait MotorDriver {
    /// Start driving in the given direction at the configured power level
    ///
    /// Calling this while already running in the other direction reverses
    /// immediately; the controller never does that without an intervening
    /// tolerance-band stop in practice.
    fn drive(&mut self, dir: Direction);

    /// Stop driving (coast)
    fn stop(&mut self);

    /// Check if the motor is currently being driven in either direction
    fn is_running(&self) -> bool;

    /// Check if the motor is stopped
    fn is_stopped(&self) -> bool {
        !self.is_running()
    }
}
