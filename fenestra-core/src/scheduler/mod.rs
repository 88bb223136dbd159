//! Cooperative tick scheduler
//!
//! A single loop interleaves command ingestion, the control step and the
//! heartbeat, then sleeps at an adaptive cadence.

pub mod tick;

pub use tick::{TickLoop, IDLE_POLL_MS, RUNNING_POLL_MS};
