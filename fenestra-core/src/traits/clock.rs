//! Time source trait

/// Trait for the scheduler's time source and sleep point
///
/// `sleep_ms` is the single yield/cancellation opportunity in the whole
/// control loop; nothing inside a tick suspends.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary epoch
    fn now_ms(&mut self) -> u64;

    /// Suspend the loop for the given number of milliseconds
    fn sleep_ms(&mut self, ms: u32);
}
