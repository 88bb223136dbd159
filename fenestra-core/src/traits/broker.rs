//! Broker client trait
//!
//! The MQTT transport itself (sockets, keepalive, reconnection) is an
//! external collaborator. The core only needs connect/publish/subscribe and
//! a non-blocking pull for inbound messages: the transport's callback-style
//! delivery is expected to land in a bounded queue that `poll` drains, so
//! all command handling stays on the scheduler's single thread.

use heapless::{String, Vec};

/// Capacity of an inbound message topic
pub const MAX_INBOUND_TOPIC: usize = 64;

/// Capacity of an inbound message payload
pub const MAX_INBOUND_PAYLOAD: usize = 64;

/// A message received from the broker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundMessage {
    /// Topic the message arrived on
    pub topic: String<MAX_INBOUND_TOPIC>,
    /// Raw payload bytes
    pub payload: Vec<u8, MAX_INBOUND_PAYLOAD>,
}

impl InboundMessage {
    /// Build a message, returning `None` if topic or payload do not fit
    ///
    /// Oversized inbound traffic is never addressed to this device; the
    /// transport may drop it.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        let mut p = Vec::new();
        p.extend_from_slice(payload).ok()?;
        Some(Self { topic: t, payload: p })
    }
}

/// Trait for the publish/subscribe transport
pub trait BrokerClient {
    /// Transport-level error type
    type Error;

    /// Establish the broker connection
    fn connect(&mut self) -> Result<(), Self::Error>;

    /// Publish a payload to a topic
    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool)
        -> Result<(), Self::Error>;

    /// Subscribe to a topic
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;

    /// Pull the next buffered inbound message, without blocking
    ///
    /// Returns `Ok(None)` when no message is waiting.
    fn poll(&mut self) -> Result<Option<InboundMessage>, Self::Error>;
}
