//! Position sensors

pub mod potentiometer;

pub use potentiometer::{AdcReader, TravelPotentiometer};
