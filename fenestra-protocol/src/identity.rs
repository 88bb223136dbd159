//! Device identity derived from hardware
//!
//! Every broker-visible name is rooted in the network interface MAC address,
//! so a device keeps its entity history across reflashes and two actuators
//! on one broker never collide.

use core::fmt::Write;

use heapless::String;

/// Capacity of the short tag string (two MAC bytes as lowercase hex)
const TAG_LEN: usize = 4;

/// Capacity of a full unique id (`wa_<tag>_stale_detector` is the longest)
pub const UNIQUE_ID_LEN: usize = 24;

/// Logical sub-devices exposed by the actuator
///
/// Both share one physical identity; the broker groups them through the
/// common device block in the discovery payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subdevice {
    /// The window cover, exposed as an opening percentage
    Position,
    /// The stall detector, exposed as a "problem" binary sensor
    StaleDetector,
}

impl Subdevice {
    /// Sub-device tag used in unique ids and entity names
    pub fn tag(&self) -> &'static str {
        match self {
            Subdevice::Position => "position",
            Subdevice::StaleDetector => "stale_detector",
        }
    }

    /// Discovery platform under the discovery root
    pub fn platform(&self) -> &'static str {
        match self {
            Subdevice::Position => "cover",
            Subdevice::StaleDetector => "binary_sensor",
        }
    }

    /// Home Assistant device class
    pub fn device_class(&self) -> &'static str {
        match self {
            Subdevice::Position => "window",
            Subdevice::StaleDetector => "problem",
        }
    }
}

/// Stable per-device identity
///
/// Holds the full MAC (for the discovery `identifiers` field) and the short
/// tag (last two bytes as hex) used in client ids and topic names.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    mac_hex: String<12>,
    tag: String<TAG_LEN>,
}

impl DeviceId {
    /// Derive the identity from a 6-byte MAC address
    pub fn from_mac(mac: [u8; 6]) -> Self {
        let mut mac_hex = String::new();
        for byte in mac {
            // Writes to a 12-char string from 6 bytes cannot overflow
            let _ = write!(mac_hex, "{:02x}", byte);
        }

        let mut tag = String::new();
        let _ = write!(tag, "{:02x}{:02x}", mac[4], mac[5]);

        Self { mac_hex, tag }
    }

    /// Full MAC as lowercase hex, used as the discovery device identifier
    pub fn mac_hex(&self) -> &str {
        &self.mac_hex
    }

    /// Short tag (last two MAC bytes as hex)
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// MQTT client id, `Window-<tag>`
    pub fn client_id(&self) -> String<16> {
        let mut s = String::new();
        let _ = write!(s, "Window-{}", self.tag);
        s
    }

    /// Unique id for a sub-device, `wa_<tag>_<subdevice>`
    pub fn unique_id(&self, subdevice: Subdevice) -> String<UNIQUE_ID_LEN> {
        let mut s = String::new();
        let _ = write!(s, "wa_{}_{}", self.tag, subdevice.tag());
        s
    }
}
