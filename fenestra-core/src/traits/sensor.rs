//! Position sensor trait

/// Trait for the absolute travel position sensor
///
/// Implementations convert a raw transducer reading (potentiometer counts)
/// into a travel fraction where 0.0 is fully closed and 1.0 is fully open.
pub trait PositionSensor {
    /// Read the current position as an UNCLAMPED travel fraction
    ///
    /// Readings slightly outside [0, 1] are normal near the mechanical
    /// limits; callers that need a bounded value clamp on their side.
    fn read(&mut self) -> f32;
}
