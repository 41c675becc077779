//! Control loop service: the hexagonal core.
//!
//! [`ControlLoop`] owns the pump controller and one detection debouncer
//! per channel.  All I/O flows through port traits injected at call
//! sites, so the whole tick is testable with mock adapters and a fake
//! clock.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          ControlLoop          │
//! ActuatorPort ◀──│  Debouncers · PumpController  │
//!                 └──────────────────────────────┘
//! ```
//!
//! One tick:
//! 1. In Cooldown, check whether the cooldown has elapsed.  If not, hold
//!    the pump off, emit an all-zero frame, and skip sensing entirely.
//! 2. Measure every channel in order and feed its debouncer.
//! 3. OR the detection flags and drive the pump controller.
//! 4. Apply the pump command and emit the reading tuple.

use heapless::Vec;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::pump::{PumpController, PumpState, PumpStep};
use crate::fsm::StateId;
use crate::pins::MAX_CHANNELS;
use crate::sensors::Distance;
use crate::sensors::debounce::DetectionDebouncer;

use super::events::{AppEvent, TelemetryFrame};
use super::ports::{ActuatorPort, EventSink, Instant, SensorPort};

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

/// The control loop orchestrates all domain logic for one tick.
pub struct ControlLoop {
    pump: PumpController,
    debouncers: Vec<DetectionDebouncer, MAX_CHANNELS>,
    tick_count: u64,
}

impl ControlLoop {
    /// Construct the loop from configuration, one debouncer per channel.
    ///
    /// Does **not** start the state machine; call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        let mut debouncers = Vec::new();
        for _ in config.channels.iter() {
            // channels is bounded by the same capacity.
            let _ = debouncers.push(DetectionDebouncer::from_config(config));
        }

        Self {
            pump: PumpController::new(config),
            debouncers,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the hardware in its safe state and enter `Idle` at `now`.
    pub fn start(
        &mut self,
        now: Instant,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        if hw.channel_count() != self.debouncers.len() {
            warn!(
                "ControlLoop: {} channels configured but hardware exposes {}",
                self.debouncers.len(),
                hw.channel_count()
            );
        }

        hw.all_off();
        self.pump.start(now);
        sink.emit(&AppEvent::Started(self.pump.state_id()));
        info!(
            "ControlLoop started in {:?} with {} channel(s)",
            self.pump.state_id(),
            self.debouncers.len()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle and return the emitted frame.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], so one exclusive borrow reaches sensors and pump.
    pub fn tick(
        &mut self,
        now: Instant,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> TelemetryFrame {
        self.tick_count += 1;

        // 1. Cooldown gate: no sensor I/O until the dead time is over.
        if self.pump.in_cooldown() {
            let step = self.pump.update(false, now);
            self.handle_step(step, sink);

            if self.pump.in_cooldown() {
                hw.set_pump(false);
                let frame = TelemetryFrame::placeholder(self.debouncers.len());
                sink.emit(&AppEvent::Telemetry(frame.clone()));
                return frame;
            }
        }

        // 2. Measure and debounce every channel, in order.
        let mut readings: Vec<Option<Distance>, MAX_CHANNELS> = Vec::new();
        let mut object_detected = false;
        for (channel, debouncer) in self.debouncers.iter_mut().enumerate() {
            let reading = hw.measure(channel);
            let detected = debouncer.update(reading);
            object_detected |= detected;
            let _ = readings.push(reading);
        }
        debug!(
            "tick {}: readings={:?} detected={}",
            self.tick_count, readings, object_detected
        );

        // 3. Pump decision, strictly after every channel update.
        let step = self.pump.update(object_detected, now);
        self.handle_step(step, sink);

        // 4. Actuate and report.
        let pump_on = self.pump.pump_on();
        hw.set_pump(pump_on);

        let frame = TelemetryFrame::from_readings(&readings, pump_on);
        sink.emit(&AppEvent::Telemetry(frame.clone()));
        frame
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> PumpState {
        self.pump.state()
    }

    pub fn state_id(&self) -> StateId {
        self.pump.state_id()
    }

    /// Consecutive in-range readings on `channel`.
    pub fn detection_count(&self, channel: usize) -> Option<u16> {
        self.debouncers.get(channel).map(DetectionDebouncer::count)
    }

    pub fn channel_count(&self) -> usize {
        self.debouncers.len()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn handle_step(&mut self, step: PumpStep, sink: &mut impl EventSink) {
        if let Some((from, to)) = step.transition {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
        if step.reset_detection {
            for debouncer in &mut self.debouncers {
                debouncer.reset();
            }
            sink.emit(&AppEvent::DetectionReset);
        }
    }
}
