//! Board-agnostic core logic for the window actuator
//!
//! This crate contains all application logic that does not depend on
//! specific hardware or transport implementations:
//!
//! - Hardware abstraction traits (motor, position sensor, indicator, broker)
//! - Closed-loop position controller with stall detection
//! - Device-state synchronizer for the MQTT device model
//! - The cooperative tick scheduler that interleaves both
//! - Configuration type definitions
//!
//! Everything mutates on a single logical thread: inside a scheduler tick or
//! inside message handling invoked from that same tick. There are no locks
//! and the only suspension point is the scheduler's sleep between ticks.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod scheduler;
pub mod sync;
pub mod traits;
