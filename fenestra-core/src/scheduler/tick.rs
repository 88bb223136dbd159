//! The tick loop
//!
//! One iteration: drain inbound commands, propagate stall state, run one
//! control step, fire the heartbeat if due, sleep. Broker errors abort the
//! loop; bad commands are counted and dropped.

use core::convert::Infallible;

use crate::control::PositionController;
use crate::sync::{DeviceSync, SyncError};
use crate::traits::{BrokerClient, Clock, MotorDriver, PositionSensor, StatusIndicator};

/// Poll interval while the motor is running (milliseconds)
pub const RUNNING_POLL_MS: u32 = 100;

/// Poll interval while the motor is idle (milliseconds)
pub const IDLE_POLL_MS: u32 = 500;

/// Driver of the cooperative control loop
///
/// Holds no hardware itself; the synchronizer and controller are borrowed
/// per step so tests can inspect them between iterations.
#[derive(Debug, Default)]
pub struct TickLoop {
    /// Inbound messages rejected as malformed or out of range
    rejected_commands: u32,
}

impl TickLoop {
    /// Create a loop driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages dropped so far for bad payloads
    pub fn rejected_commands(&self) -> u32 {
        self.rejected_commands
    }

    /// Run one scheduler iteration
    ///
    /// Commands are applied before the control step, so a target set by an
    /// inbound message takes effect in the same iteration. Returns the
    /// number of milliseconds to sleep before the next step.
    pub fn step<B, M, S, L>(
        &mut self,
        sync: &mut DeviceSync<B>,
        ctrl: &mut PositionController<M, S, L>,
        now_ms: u64,
    ) -> Result<u32, SyncError<B::Error>>
    where
        B: BrokerClient,
        M: MotorDriver,
        S: PositionSensor,
        L: StatusIndicator,
    {
        while let Some(msg) = sync.poll()? {
            match sync.handle_message(&msg.topic, &msg.payload, ctrl, now_ms) {
                Ok(()) => {}
                Err(SyncError::Broker(e)) => return Err(SyncError::Broker(e)),
                Err(_) => {
                    // Bad payload from the far side; drop it and move on
                    self.rejected_commands = self.rejected_commands.saturating_add(1);
                }
            }
        }

        sync.set_stalled(ctrl.is_stalled(), ctrl, now_ms)?;

        ctrl.tick();

        if sync.heartbeat_due(now_ms) {
            sync.send_update(now_ms)?;
        }

        Ok(if ctrl.is_running() {
            RUNNING_POLL_MS
        } else {
            IDLE_POLL_MS
        })
    }

    /// Register with the broker and run the loop forever
    pub fn run<B, M, S, L, C>(
        &mut self,
        sync: &mut DeviceSync<B>,
        ctrl: &mut PositionController<M, S, L>,
        clock: &mut C,
    ) -> Result<Infallible, SyncError<B::Error>>
    where
        B: BrokerClient,
        M: MotorDriver,
        S: PositionSensor,
        L: StatusIndicator,
        C: Clock,
    {
        sync.start(ctrl, clock.now_ms())?;
        loop {
            let sleep = self.step(sync, ctrl, clock.now_ms())?;
            clock.sleep_ms(sleep);
        }
    }
}
