//! On/off pump driver.
//!
//! The pump is switched by a single output pin (relay or MOSFET gate),
//! high = running.  This driver is a dumb actuator: run-time limits and
//! cooldown are enforced by the pump controller, not here.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::error::ActuatorError;

pub struct PumpDriver<P> {
    pin: P,
    running: bool,
}

impl<P: OutputPin> PumpDriver<P> {
    /// Wrap `pin`.  The pin is assumed low (pump off) on entry.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            running: false,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;

        if self.running != on {
            debug!("pump {}", if on { "ON" } else { "OFF" });
        }
        self.running = on;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.set(false)
    }

    /// Last level successfully written to the pin.
    pub fn is_running(&self) -> bool {
        self.running
    }
}
