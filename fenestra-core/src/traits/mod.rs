//! Hardware and transport abstraction traits
//!
//! These traits define the interface between the control logic and the
//! board/network bring-up layer that lives outside this workspace.

pub mod broker;
pub mod clock;
pub mod indicator;
pub mod motor;
pub mod sensor;

pub use broker::{BrokerClient, InboundMessage, MAX_INBOUND_PAYLOAD, MAX_INBOUND_TOPIC};
pub use clock::Clock;
pub use indicator::StatusIndicator;
pub use motor::{Direction, MotorDriver};
pub use sensor::PositionSensor;
