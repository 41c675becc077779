//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the [`PumpDriver`], a clock for echo
//! timeouts, and a blocking delay for trigger pulses, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only module
//! in the system that touches actual hardware.  On non-espidf targets
//! the GPIO layer falls back to its simulated pin table.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{ActuatorPort, Clock, EchoCapture, SensorPort};
use crate::drivers::pump::PumpDriver;
use crate::sensors::{Distance, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<T, E, P, C, D> {
    sensor_hub: SensorHub<T, E>,
    pump: PumpDriver<P>,
    clock: C,
    delay: D,
}

impl<T, E, P, C, D> HardwareAdapter<T, E, P, C, D>
where
    T: OutputPin,
    E: EchoCapture,
    P: OutputPin,
    C: Clock,
    D: DelayNs,
{
    pub fn new(sensor_hub: SensorHub<T, E>, pump: PumpDriver<P>, clock: C, delay: D) -> Self {
        Self {
            sensor_hub,
            pump,
            clock,
            delay,
        }
    }

    /// Delay provider, shared with the tick cadence.
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn pump_running(&self) -> bool {
        self.pump.is_running()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<T, E, P, C, D> SensorPort for HardwareAdapter<T, E, P, C, D>
where
    T: OutputPin,
    E: EchoCapture,
    P: OutputPin,
    C: Clock,
    D: DelayNs,
{
    fn channel_count(&self) -> usize {
        self.sensor_hub.len()
    }

    fn measure(&mut self, channel: usize) -> Option<Distance> {
        self.sensor_hub
            .measure(channel, &self.clock, &mut self.delay)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<T, E, P, C, D> ActuatorPort for HardwareAdapter<T, E, P, C, D>
where
    T: OutputPin,
    E: EchoCapture,
    P: OutputPin,
    C: Clock,
    D: DelayNs,
{
    fn set_pump(&mut self, on: bool) {
        if let Err(e) = self.pump.set(on) {
            warn!("pump write ({}) failed: {}", if on { "on" } else { "off" }, e);
        }
    }

    fn all_off(&mut self) {
        if let Err(e) = self.pump.stop() {
            warn!("pump stop failed: {}", e);
        }
        self.sensor_hub.idle_all();
    }
}
