//! MQTT device model for the Fenestra window actuator
//!
//! This crate defines everything the actuator says to (and hears from) a
//! Home Assistant style MQTT broker:
//!
//! - Stable device identity derived from the hardware MAC address
//! - The topic grammar for discovery and runtime traffic
//! - Retained discovery payloads that let the broker auto-configure the
//!   actuator as two logical sub-devices sharing one physical identity:
//!   a `cover` (opening percentage) and a `binary_sensor` (stall problem)
//! - Inbound command parsing and outbound state payload formatting
//!
//! # Topic layout
//!
//! ```text
//! homeassistant/cover/wa_<tag>_position/config            retained discovery
//! homeassistant/binary_sensor/wa_<tag>_stale_detector/config
//! Household/window/wa_<tag>_position/state/set            OPEN | CLOSE | STOP
//! Household/window/wa_<tag>_position/position/set         "0".."100"
//! Household/window/wa_<tag>_position/position/notify      "0".."100"
//! Household/window/wa_<tag>_stale_detector/stale/notify   ON | OFF
//! ```
//!
//! The crate is transport-agnostic: it builds and parses strings, nothing
//! else. The broker connection itself lives behind a trait in the core crate.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod discovery;
pub mod identity;
pub mod topics;

pub use command::{position_payload, stall_payload, CommandError, CoverCommand};
pub use discovery::{DeviceInfo, DiscoveryDescriptor, DiscoveryError, SubdeviceTopics};
pub use identity::{DeviceId, Subdevice};
pub use topics::{CoverTopics, ProblemTopics, TopicError, TopicString, DISCOVERY_ROOT, STATE_ROOT};
