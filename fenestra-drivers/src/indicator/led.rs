//! Status LED
//!
//! A single LED on a GPIO pin. The pin can be wired active-high or
//! active-low (common for on-board LEDs sinking into the pin).

use embedded_hal::digital::OutputPin;
use fenestra_core::traits::StatusIndicator;

/// Status LED on a GPIO pin
pub struct StatusLed<P> {
    pin: P,
    /// If true, LED ON = pin LOW
    inverted: bool,
    /// Current logical state (true = lit)
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Create an LED driver; the LED starts dark
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut led = Self {
            pin,
            inverted,
            on: false,
        };
        led.set_on(false);
        led
    }

    /// Create an LED driver with active-high wiring
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create an LED driver with active-low wiring
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Current logical state
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: OutputPin> StatusIndicator for StatusLed<P> {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        if on != self.inverted {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
    }

    fn toggle(&mut self) {
        self.set_on(!self.on);
    }
}
