//! Retained discovery payloads
//!
//! A discovery message is a JSON object published once (retained) to the
//! sub-device's config topic. It tells the automation hub which topics the
//! actuator speaks on and carries a shared device block so the cover and the
//! problem sensor show up grouped as one physical unit.
//!
//! Payloads are hand-encoded into a fixed `heapless::String`; there is no
//! allocator and the field set is small and closed.

use core::fmt::Write;

use heapless::String;

use crate::identity::{DeviceId, Subdevice, UNIQUE_ID_LEN};
use crate::topics::{discovery_topic, CoverTopics, ProblemTopics, TopicError, TopicString};

/// Capacity of an encoded discovery payload
pub const MAX_DISCOVERY_PAYLOAD: usize = 512;

/// Errors building or encoding a discovery descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoveryError {
    /// Encoded payload exceeds the fixed buffer capacity
    PayloadTooLarge,
    /// A topic string overflowed its buffer
    Topic(TopicError),
}

impl From<TopicError> for DiscoveryError {
    fn from(e: TopicError) -> Self {
        DiscoveryError::Topic(e)
    }
}

/// Shared device metadata block
///
/// Identical across both sub-devices; the hub uses `identifiers` to merge
/// them into a single device entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    /// Hardware model name
    pub model: String<16>,
    /// Manufacturer name
    pub manufacturer: String<16>,
    /// Display name shown in the hub UI
    pub name: String<32>,
    /// Stable identifier (full MAC as hex)
    pub identifiers: String<12>,
}

impl DeviceInfo {
    /// Build the device block from configuration strings and the identity
    pub fn new(model: &str, manufacturer: &str, name: &str, id: &DeviceId) -> Self {
        let mut info = Self {
            model: String::new(),
            manufacturer: String::new(),
            name: String::new(),
            identifiers: String::new(),
        };
        // Truncation over failure: these are display strings
        truncate_into(&mut info.model, model);
        truncate_into(&mut info.manufacturer, manufacturer);
        truncate_into(&mut info.name, name);
        let _ = info.identifiers.push_str(id.mac_hex());
        info
    }
}

/// Copy as much of `src` as fits
fn truncate_into<const N: usize>(dst: &mut String<N>, src: &str) {
    for c in src.chars() {
        if dst.push(c).is_err() {
            break;
        }
    }
}

/// Topic set advertised by a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubdeviceTopics {
    /// Cover: command, set-position and position-state topics
    Cover(CoverTopics),
    /// Problem sensor: state topic only
    Problem(ProblemTopics),
}

/// Per-sub-device discovery descriptor
///
/// Created once at startup and immutable thereafter. Published retained to
/// [`DiscoveryDescriptor::config_topic`] before any state traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiscoveryDescriptor {
    subdevice: Subdevice,
    unique_id: String<UNIQUE_ID_LEN>,
    config_topic: TopicString,
    device: DeviceInfo,
    /// Hub-side entity expiry hint in seconds
    expire_after_s: u32,
    topics: SubdeviceTopics,
}

impl DiscoveryDescriptor {
    /// Build the descriptor for the window cover sub-device
    pub fn cover(
        id: &DeviceId,
        device: DeviceInfo,
        expire_after_s: u32,
    ) -> Result<Self, DiscoveryError> {
        Ok(Self {
            subdevice: Subdevice::Position,
            unique_id: id.unique_id(Subdevice::Position),
            config_topic: discovery_topic(id, Subdevice::Position)?,
            device,
            expire_after_s,
            topics: SubdeviceTopics::Cover(CoverTopics::for_device(id)?),
        })
    }

    /// Build the descriptor for the stall problem sensor
    pub fn problem(
        id: &DeviceId,
        device: DeviceInfo,
        expire_after_s: u32,
    ) -> Result<Self, DiscoveryError> {
        Ok(Self {
            subdevice: Subdevice::StaleDetector,
            unique_id: id.unique_id(Subdevice::StaleDetector),
            config_topic: discovery_topic(id, Subdevice::StaleDetector)?,
            device,
            expire_after_s,
            topics: SubdeviceTopics::Problem(ProblemTopics::for_device(id)?),
        })
    }

    /// The retained config topic this descriptor is published to
    pub fn config_topic(&self) -> &str {
        &self.config_topic
    }

    /// The advertised runtime topic set
    pub fn topics(&self) -> &SubdeviceTopics {
        &self.topics
    }

    /// The sub-device this descriptor describes
    pub fn subdevice(&self) -> Subdevice {
        self.subdevice
    }

    /// Encode the descriptor as a JSON payload
    pub fn encode(&self) -> Result<String<MAX_DISCOVERY_PAYLOAD>, DiscoveryError> {
        let mut out: String<MAX_DISCOVERY_PAYLOAD> = String::new();

        let r: core::fmt::Result = (|| {
            out.push_str("{").map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "name", self.subdevice.tag())?;
            out.push(',').map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "unique_id", &self.unique_id)?;
            out.push(',').map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "device_class", self.subdevice.device_class())?;
            out.push(',').map_err(|_| core::fmt::Error)?;
            write!(out, "\"expire_after\":{}", self.expire_after_s)?;

            // Shared device block
            out.push_str(",\"device\":{").map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "model", &self.device.model)?;
            out.push(',').map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "manufacturer", &self.device.manufacturer)?;
            out.push(',').map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "name", &self.device.name)?;
            out.push(',').map_err(|_| core::fmt::Error)?;
            write_str_field(&mut out, "identifiers", &self.device.identifiers)?;
            out.push('}').map_err(|_| core::fmt::Error)?;

            match &self.topics {
                SubdeviceTopics::Cover(t) => {
                    out.push_str(",\"unit_of_measurement\":\"%\"")
                        .map_err(|_| core::fmt::Error)?;
                    out.push(',').map_err(|_| core::fmt::Error)?;
                    write_str_field(&mut out, "command_topic", &t.command)?;
                    out.push(',').map_err(|_| core::fmt::Error)?;
                    write_str_field(&mut out, "set_position_topic", &t.set_position)?;
                    out.push(',').map_err(|_| core::fmt::Error)?;
                    write_str_field(&mut out, "position_topic", &t.position_state)?;
                }
                SubdeviceTopics::Problem(t) => {
                    out.push(',').map_err(|_| core::fmt::Error)?;
                    write_str_field(&mut out, "state_topic", &t.state)?;
                }
            }

            out.push('}').map_err(|_| core::fmt::Error)?;
            Ok(())
        })();

        r.map_err(|_| DiscoveryError::PayloadTooLarge)?;
        Ok(out)
    }
}

/// Write a `"key":"value"` pair, escaping quotes and backslashes in the value
fn write_str_field<const N: usize>(
    out: &mut String<N>,
    key: &str,
    value: &str,
) -> core::fmt::Result {
    write!(out, "\"{}\":\"", key)?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\').map_err(|_| core::fmt::Error)?;
        }
        out.push(c).map_err(|_| core::fmt::Error)?;
    }
    out.push('"').map_err(|_| core::fmt::Error)
}
