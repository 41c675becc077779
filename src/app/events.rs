//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: print the telemetry tuple for a
//! serial plotter, log state changes, or record them in tests.

use core::fmt;

use heapless::Vec;

use crate::fsm::StateId;
use crate::pins::MAX_CHANNELS;
use crate::sensors::Distance;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Per-tick reading tuple.
    Telemetry(TelemetryFrame),

    /// The pump state machine transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Every channel's detection counter was zeroed (leaving Cooldown).
    DetectionReset,

    /// The control loop has started (carries initial state).
    Started(StateId),
}

/// One tick's output: a distance per channel followed by the pump flag.
///
/// Formats as a fixed-arity tuple, e.g. `(123.4, 0.0, 38.2, 1)`, which is
/// what serial plotters expect.  Absent readings print as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    pub distances_cm: Vec<f32, MAX_CHANNELS>,
    pub pump_on: bool,
}

impl TelemetryFrame {
    /// Build a frame from raw readings.
    pub fn from_readings(readings: &[Option<Distance>], pump_on: bool) -> Self {
        let distances_cm = readings
            .iter()
            .take(MAX_CHANNELS)
            .map(|r| r.map_or(0.0, Distance::cm))
            .collect();
        Self {
            distances_cm,
            pump_on,
        }
    }

    /// All-zero frame emitted while sensing is suspended.
    pub fn placeholder(channels: usize) -> Self {
        let mut distances_cm = Vec::new();
        for _ in 0..channels.min(MAX_CHANNELS) {
            let _ = distances_cm.push(0.0);
        }
        Self {
            distances_cm,
            pump_on: false,
        }
    }

    /// `true` if every distance is zero and the pump is off.
    pub fn is_placeholder(&self) -> bool {
        !self.pump_on && self.distances_cm.iter().all(|d| *d == 0.0)
    }

    /// Number of values in the tuple (channels + pump flag).
    pub fn arity(&self) -> usize {
        self.distances_cm.len() + 1
    }
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for d in &self.distances_cm {
            write!(f, "{:.1}, ", d)?;
        }
        write!(f, "{})", u8::from(self.pump_on))
    }
}
