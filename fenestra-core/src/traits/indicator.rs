//! Status indicator trait

/// Trait for the activity/fault indicator (typically the board LED)
///
/// The controller holds it on while the motor is driven and blinks it
/// once per tick while stalled.
pub trait StatusIndicator {
    /// Set the indicator on or off
    fn set_on(&mut self, on: bool);

    /// Invert the current indicator state
    fn toggle(&mut self);
}
