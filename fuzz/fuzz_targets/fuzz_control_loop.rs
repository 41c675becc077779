//! Fuzz target: `ControlLoop` tick sequence
//!
//! Each 4-byte chunk of input is one tick: a time step and one raw
//! reading per channel.  Verifies:
//! - No panics for any reading stream or tick spacing
//! - Pump output is on iff the state machine is Running
//! - A run never outlasts the configured max on-time
//! - Cooldown ticks never touch the sensors
//!
//! cargo fuzz run fuzz_control_loop

#![no_main]

use libfuzzer_sys::fuzz_target;
use pumpsense::app::events::AppEvent;
use pumpsense::app::ports::{ActuatorPort, EventSink, Instant, SensorPort};
use pumpsense::app::service::ControlLoop;
use pumpsense::config::SystemConfig;
use pumpsense::fsm::StateId;
use pumpsense::sensors::Distance;

const CHANNELS: usize = 3;

struct Rig {
    raw: [u8; CHANNELS],
    measures: usize,
    pump: bool,
}

impl SensorPort for Rig {
    fn channel_count(&self) -> usize {
        CHANNELS
    }

    fn measure(&mut self, channel: usize) -> Option<Distance> {
        self.measures += 1;
        // 0 = echo timeout, otherwise 1..=255 cm straddling the threshold.
        Distance::from_cm(f32::from(self.raw[channel]))
    }
}

impl ActuatorPort for Rig {
    fn set_pump(&mut self, on: bool) {
        self.pump = on;
    }

    fn all_off(&mut self) {
        self.pump = false;
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let max_on = u64::from(config.pump_max_on_time_ms) * 1_000;

    let mut app = ControlLoop::new(&config);
    let mut rig = Rig { raw: [0; CHANNELS], measures: 0, pump: true };
    app.start(Instant::from_micros(0), &mut rig, &mut Discard);

    let mut t_us = 0_u64;
    let mut run_started: Option<u64> = None;

    for chunk in data.chunks_exact(1 + CHANNELS) {
        t_us += u64::from(chunk[0]) * 10_000;
        rig.raw.copy_from_slice(&chunk[1..]);

        let was_cooldown = app.state_id() == StateId::Cooldown;
        let before = rig.measures;
        app.tick(Instant::from_micros(t_us), &mut rig, &mut Discard);

        assert_eq!(rig.pump, app.state_id() == StateId::Running);
        if was_cooldown && app.state_id() == StateId::Cooldown {
            assert_eq!(rig.measures, before);
        }

        match (rig.pump, run_started) {
            (true, None) => run_started = Some(t_us),
            (true, Some(start)) => assert!(t_us - start < max_on),
            (false, _) => run_started = None,
        }
    }
});
