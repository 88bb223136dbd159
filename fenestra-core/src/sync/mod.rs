//! Device-state synchronization with the broker
//!
//! Maps controller state onto the MQTT device model: retained discovery
//! registration, inbound command handling, outbound state publication and
//! the staleness heartbeat.

pub mod device;

pub use device::{DeviceSync, SyncError, EXPIRE_AFTER_S, HEARTBEAT_INTERVAL_MS};
