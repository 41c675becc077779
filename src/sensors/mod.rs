//! Sensor subsystem: ultrasonic distance drivers, echo capture, the
//! per-channel debounce filter, and the aggregating [`SensorHub`].
//!
//! The hub owns every channel's trigger/echo pair and measures them in
//! configuration order.  Debounce state is domain state and lives with
//! the [`ControlLoop`](crate::app::service::ControlLoop), one
//! [`DetectionDebouncer`](debounce::DetectionDebouncer) per channel.

pub mod debounce;
pub mod echo;
pub mod ultrasonic;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::app::ports::{Clock, EchoCapture};
use crate::pins::MAX_CHANNELS;
use ultrasonic::DistanceSensor;

/// A measured distance in centimetres.  Always finite and strictly
/// positive; "no reading" is represented by `Option::None`, never by 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance(f32);

impl Distance {
    /// `None` for zero, negative, or non-finite input.
    pub fn from_cm(cm: f32) -> Option<Self> {
        (cm.is_finite() && cm > 0.0).then_some(Self(cm))
    }

    pub fn cm(self) -> f32 {
        self.0
    }
}

/// Owns every channel's [`DistanceSensor`] and measures on request.
pub struct SensorHub<T, E> {
    sensors: Vec<DistanceSensor<T, E>, MAX_CHANNELS>,
}

impl<T: OutputPin, E: EchoCapture> SensorHub<T, E> {
    pub fn new() -> Self {
        Self { sensors: Vec::new() }
    }

    /// Append a channel.  Hands the sensor back if the hub is full.
    pub fn add(&mut self, sensor: DistanceSensor<T, E>) -> Result<(), DistanceSensor<T, E>> {
        self.sensors.push(sensor)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Measure one channel.  Out-of-range indices read as absent.
    pub fn measure(
        &mut self,
        channel: usize,
        clock: &impl Clock,
        delay: &mut impl DelayNs,
    ) -> Option<Distance> {
        self.sensors.get_mut(channel)?.measure(clock, delay)
    }

    /// Put every channel into its quiescent state.
    pub fn idle_all(&mut self) {
        for sensor in &mut self.sensors {
            sensor.idle();
        }
    }
}

impl<T: OutputPin, E: EchoCapture> Default for SensorHub<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_rejects_non_positive() {
        assert!(Distance::from_cm(0.0).is_none());
        assert!(Distance::from_cm(-3.0).is_none());
        assert!(Distance::from_cm(f32::INFINITY).is_none());
        assert!(Distance::from_cm(f32::NAN).is_none());
        assert_eq!(Distance::from_cm(12.5).map(Distance::cm), Some(12.5));
    }
}
