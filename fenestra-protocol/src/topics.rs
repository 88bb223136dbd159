//! Topic grammar for discovery and runtime traffic
//!
//! Discovery lives under `homeassistant/<platform>/<unique-id>/config`;
//! runtime traffic lives under `Household/window/<unique-id>/...`.

use core::fmt::Write;

use heapless::String;

use crate::identity::{DeviceId, Subdevice};

/// Root for retained discovery configuration messages
pub const DISCOVERY_ROOT: &str = "homeassistant";

/// Root for runtime state/command traffic
pub const STATE_ROOT: &str = "Household/window";

/// Capacity of a single topic string
pub type TopicString = String<64>;

/// Errors building topic strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Topic exceeds the fixed buffer capacity
    Overflow,
}

fn topic(base: &str, uid: &str, suffix: &str) -> Result<TopicString, TopicError> {
    let mut s = TopicString::new();
    write!(s, "{}/{}{}", base, uid, suffix).map_err(|_| TopicError::Overflow)?;
    Ok(s)
}

/// Discovery config topic for a sub-device
pub fn discovery_topic(id: &DeviceId, subdevice: Subdevice) -> Result<TopicString, TopicError> {
    let mut s = TopicString::new();
    write!(
        s,
        "{}/{}/{}/config",
        DISCOVERY_ROOT,
        subdevice.platform(),
        id.unique_id(subdevice)
    )
    .map_err(|_| TopicError::Overflow)?;
    Ok(s)
}

/// Runtime topics for the cover sub-device
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoverTopics {
    /// Inbound OPEN/CLOSE/STOP commands
    pub command: TopicString,
    /// Inbound target percentage
    pub set_position: TopicString,
    /// Outbound position percentage
    pub position_state: TopicString,
}

impl CoverTopics {
    /// Build the cover topic set for a device
    pub fn for_device(id: &DeviceId) -> Result<Self, TopicError> {
        let uid = id.unique_id(Subdevice::Position);
        Ok(Self {
            command: topic(STATE_ROOT, &uid, "/state/set")?,
            set_position: topic(STATE_ROOT, &uid, "/position/set")?,
            position_state: topic(STATE_ROOT, &uid, "/position/notify")?,
        })
    }
}

/// Runtime topics for the stall problem sensor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProblemTopics {
    /// Outbound stall state
    pub state: TopicString,
}

impl ProblemTopics {
    /// Build the problem-sensor topic set for a device
    pub fn for_device(id: &DeviceId) -> Result<Self, TopicError> {
        let uid = id.unique_id(Subdevice::StaleDetector);
        Ok(Self {
            state: topic(STATE_ROOT, &uid, "/stale/notify")?,
        })
    }
}
