//! Closed-loop position control
//!
//! Tolerance-band control of the actuator motor against the travel sensor,
//! with stall detection over consecutive identical readings.

pub mod controller;
pub mod stall;

pub use controller::{ControlError, PositionController, BASE_TOLERANCE};
pub use stall::StallDetector;
