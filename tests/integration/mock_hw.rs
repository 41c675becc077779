//! Mock hardware adapter for integration tests.
//!
//! Serves scripted distances per channel and records every actuator
//! call and every measurement so tests can assert on the full history
//! without touching real GPIO.

use pumpsense::app::events::{AppEvent, TelemetryFrame};
use pumpsense::app::ports::{ActuatorPort, EventSink, Instant, SensorPort};
use pumpsense::app::service::ControlLoop;
use pumpsense::config::SystemConfig;
use pumpsense::sensors::Distance;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetPump(bool),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    distances: Vec<Option<f32>>,
    /// Channel index of every `measure` call, in order.
    pub measured: Vec<usize>,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(channels: usize) -> Self {
        Self {
            distances: vec![None; channels],
            measured: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Script what `channel` reads from now on (`None` = echo timeout).
    pub fn set_distance(&mut self, channel: usize, cm: Option<f32>) {
        self.distances[channel] = cm;
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetPump(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
            })
            .unwrap_or(false)
    }
}

impl SensorPort for MockHardware {
    fn channel_count(&self) -> usize {
        self.distances.len()
    }

    fn measure(&mut self, channel: usize) -> Option<Distance> {
        self.measured.push(channel);
        self.distances
            .get(channel)
            .copied()
            .flatten()
            .and_then(Distance::from_cm)
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump(&mut self, on: bool) {
        self.calls.push(ActuatorCall::SetPump(on));
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── Capturing event sink ──────────────────────────────────────

#[derive(Default)]
pub struct CaptureSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CaptureSink {
    pub fn frames(&self) -> Vec<&TelemetryFrame> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Telemetry(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }
}

impl EventSink for CaptureSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// A started control loop ticking on a 200 ms grid, tick 1 at t = 0.
pub struct Rig {
    pub app: ControlLoop,
    pub hw: MockHardware,
    pub sink: CaptureSink,
    pub ticks: u64,
    period_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(channels: usize) -> Self {
        let mut config = SystemConfig::default();
        config.channels.truncate(channels);
        Self::with_config(&config)
    }

    pub fn with_config(config: &SystemConfig) -> Self {
        let mut app = ControlLoop::new(config);
        let mut hw = MockHardware::new(config.channel_count());
        let mut sink = CaptureSink::default();
        app.start(Instant::from_millis(0), &mut hw, &mut sink);
        Self {
            app,
            hw,
            sink,
            ticks: 0,
            period_ms: u64::from(config.measurement_interval_ms),
        }
    }

    /// Time of the next tick.
    pub fn now(&self) -> Instant {
        Instant::from_millis(self.ticks * self.period_ms)
    }

    pub fn tick(&mut self) -> TelemetryFrame {
        let now = self.now();
        self.ticks += 1;
        self.app.tick(now, &mut self.hw, &mut self.sink)
    }

    /// Run `n` ticks and return their frames as text.
    pub fn run(&mut self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.tick().to_string()).collect()
    }
}
