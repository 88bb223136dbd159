//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in fenestra-core for the actuator hardware:
//!
//! - H-bridge DC motor driver
//! - Potentiometer travel sensor (via ADC)
//! - Status LED

#![no_std]
#![deny(unsafe_code)]

pub mod indicator;
pub mod motor;
pub mod sensor;
