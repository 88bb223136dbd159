//! Inbound command parsing and outbound state payload formatting
//!
//! Command payloads arrive as raw bytes from the broker. Anything that is
//! not an exact `OPEN`/`CLOSE`/`STOP` keyword or an in-range integer
//! percentage is rejected - never clamped or coerced.

use core::fmt::Write;

use heapless::String;

/// Errors parsing an inbound command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Payload is not a recognized keyword or not a decimal integer
    Malformed,
    /// Numeric payload parsed but falls outside 0..=100
    OutOfRange,
}

/// A parsed cover command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoverCommand {
    /// Drive fully open (position 1.0)
    Open,
    /// Drive fully closed (position 0.0)
    Close,
    /// Stop motion, clear stall, republish actual position
    Stop,
    /// Drive to a percentage of travel
    SetPosition(u8),
}

impl CoverCommand {
    /// Parse a payload received on the command topic
    pub fn parse_state(payload: &[u8]) -> Result<Self, CommandError> {
        match payload {
            b"OPEN" => Ok(CoverCommand::Open),
            b"CLOSE" => Ok(CoverCommand::Close),
            b"STOP" => Ok(CoverCommand::Stop),
            _ => Err(CommandError::Malformed),
        }
    }

    /// Parse a payload received on the set-position topic
    pub fn parse_set_position(payload: &[u8]) -> Result<Self, CommandError> {
        let text = core::str::from_utf8(payload).map_err(|_| CommandError::Malformed)?;
        let percent: u16 = text.trim().parse().map_err(|_| CommandError::Malformed)?;
        if percent > 100 {
            return Err(CommandError::OutOfRange);
        }
        Ok(CoverCommand::SetPosition(percent as u8))
    }

    /// The commanded travel fraction, if this command carries one
    pub fn target_fraction(&self) -> Option<f32> {
        match self {
            CoverCommand::Open => Some(1.0),
            CoverCommand::Close => Some(0.0),
            CoverCommand::SetPosition(p) => Some(*p as f32 / 100.0),
            CoverCommand::Stop => None,
        }
    }
}

/// Stall state payload for the problem sensor topic
pub fn stall_payload(stalled: bool) -> &'static str {
    if stalled {
        "ON"
    } else {
        "OFF"
    }
}

/// Position payload: integer percentage of travel, rounded
///
/// The input is expected to be a clamped fraction in [0, 1]; the output
/// saturates at 100 regardless.
pub fn position_payload(position: f32) -> String<4> {
    let percent = ((position * 100.0 + 0.5) as u32).min(100);
    let mut s = String::new();
    // Three digits maximum, cannot overflow the buffer
    let _ = write!(s, "{}", percent);
    s
}
