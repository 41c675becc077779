//! End-to-end tests for the sense → debounce → FSM → pump pipeline.
//!
//! Every test drives `ControlLoop` through the mock adapters on a
//! 200 ms tick grid with tick 1 at t = 0, so all timings are exact.

use super::mock_hw::{ActuatorCall, Rig};

use pumpsense::app::events::AppEvent;
use pumpsense::control::pump::PumpState;
use pumpsense::fsm::StateId;

const ON: &str = "(20.0, 1)";
const OFF: &str = "(20.0, 0)";
const BLANK: &str = "(0.0, 0)";

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_forces_safe_state_and_announces_idle() {
    let rig = Rig::new(3);
    assert_eq!(rig.hw.calls, vec![ActuatorCall::AllOff]);
    assert_eq!(rig.sink.events, vec![AppEvent::Started(StateId::Idle)]);
    assert_eq!(rig.app.state(), PumpState::Idle);
}

#[test]
fn frame_arity_tracks_channel_count() {
    let mut rig = Rig::new(3);
    rig.hw.set_distance(1, Some(55.5));
    let frame = rig.tick();
    assert_eq!(frame.arity(), 4);
    assert_eq!(frame.to_string(), "(0.0, 55.5, 0.0, 0)");
    assert_eq!(rig.hw.measured, vec![0, 1, 2], "channels measured in order");
}

// ── Idle → Running ────────────────────────────────────────────

#[test]
fn fifteen_in_range_ticks_start_the_pump() {
    let mut rig = Rig::new(1);
    rig.hw.set_distance(0, Some(20.0));

    let lines = rig.run(16);
    assert!(lines[..14].iter().all(|l| l == OFF), "{:?}", lines);
    assert_eq!(lines[14], ON, "pump turns on at tick 15");
    assert_eq!(lines[15], ON);

    assert_eq!(
        rig.sink.count(&AppEvent::StateChanged {
            from: StateId::Idle,
            to: StateId::Running,
        }),
        1
    );
    assert!(rig.hw.pump_on());
    assert_eq!(
        rig.app.state(),
        PumpState::Running {
            started_at: pumpsense::app::ports::Instant::from_millis(2_800)
        }
    );
}

#[test]
fn fourteen_then_one_out_of_range_never_detects() {
    let mut rig = Rig::new(1);
    rig.hw.set_distance(0, Some(20.0));
    rig.run(14);
    assert_eq!(rig.app.detection_count(0), Some(14));

    rig.hw.set_distance(0, Some(40.0));
    rig.tick();
    assert_eq!(rig.app.detection_count(0), Some(0));

    rig.hw.set_distance(0, Some(20.0));
    let lines = rig.run(14);
    assert!(lines.iter().all(|l| l == OFF));
    assert_eq!(rig.app.state_id(), StateId::Idle);
}

#[test]
fn any_channel_can_trigger() {
    let mut rig = Rig::new(3);
    rig.hw.set_distance(2, Some(5.0));
    rig.run(14);
    assert_eq!(rig.app.state_id(), StateId::Idle);
    let frame = rig.tick();
    assert_eq!(frame.to_string(), "(0.0, 0.0, 5.0, 1)");
    assert_eq!(rig.app.state_id(), StateId::Running);
}

#[test]
fn idle_reasserts_pump_off_every_tick() {
    let mut rig = Rig::new(1);
    rig.run(3);
    let offs = rig
        .hw
        .calls
        .iter()
        .filter(|c| **c == ActuatorCall::SetPump(false))
        .count();
    assert_eq!(offs, 3);
}

// ── Running → Cooldown ────────────────────────────────────────

#[test]
fn losing_detection_ends_the_run_on_that_tick() {
    let mut rig = Rig::new(1);
    rig.hw.set_distance(0, Some(20.0));
    rig.run(15);
    assert!(rig.hw.pump_on());

    rig.hw.set_distance(0, None);
    let frame = rig.tick();
    assert_eq!(frame.to_string(), BLANK);
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.app.state_id(), StateId::Cooldown);
}

#[test]
fn max_on_time_forces_cooldown_then_sensing_resumes() {
    let mut rig = Rig::new(1);
    rig.hw.set_distance(0, Some(20.0));

    // Ticks 1..=14 idle, 15..=114 running (t = 2.8 s .. 22.6 s).
    let lines = rig.run(114);
    assert!(lines[14..].iter().all(|l| l == ON));

    // Tick 115, t = 22.8 s: exactly 20 s after the pump started.
    let measured_before = rig.hw.measured.len();
    assert_eq!(rig.tick().to_string(), OFF);
    assert_eq!(rig.app.state_id(), StateId::Cooldown);
    assert_eq!(rig.hw.measured.len(), measured_before + 1);

    // Cooldown ticks up to t = 26.6 s: blank frames, no sensor I/O.
    let measured_before = rig.hw.measured.len();
    let lines = rig.run(19);
    assert!(lines.iter().all(|l| l == BLANK), "{:?}", lines);
    assert_eq!(rig.hw.measured.len(), measured_before);
    assert!(!rig.hw.pump_on());

    // t = 26.8 s: cooldown over, counters reset, measuring again.
    assert_eq!(rig.tick().to_string(), OFF);
    assert_eq!(rig.app.state_id(), StateId::Idle);
    assert_eq!(rig.app.detection_count(0), Some(1));
    assert_eq!(rig.sink.count(&AppEvent::DetectionReset), 1);

    // A fresh 15-tick debounce is needed before the next run.
    let lines = rig.run(13);
    assert!(lines.iter().all(|l| l == OFF));
    assert_eq!(rig.tick().to_string(), ON);
}

// ── Cooldown ──────────────────────────────────────────────────

#[test]
fn cooldown_holds_pump_off_without_measuring() {
    let mut rig = Rig::new(2);
    rig.hw.set_distance(0, Some(20.0));
    rig.run(15);
    rig.hw.set_distance(0, None);
    rig.tick();
    assert_eq!(rig.app.state_id(), StateId::Cooldown);

    // Readings in range during cooldown must not be seen.
    rig.hw.set_distance(0, Some(10.0));
    rig.hw.set_distance(1, Some(10.0));
    rig.hw.calls.clear();
    let measured_before = rig.hw.measured.len();

    for _ in 0..19 {
        let frame = rig.tick();
        assert!(frame.is_placeholder());
        assert_eq!(frame.to_string(), "(0.0, 0.0, 0)");
    }
    assert_eq!(rig.hw.measured.len(), measured_before);
    assert!(rig
        .hw
        .calls
        .iter()
        .all(|c| *c == ActuatorCall::SetPump(false)));
    assert_eq!(rig.app.detection_count(0), Some(0));
}

#[test]
fn mid_count_channel_restarts_from_zero_after_cooldown() {
    let mut rig = Rig::new(2);
    rig.hw.set_distance(0, Some(20.0));
    rig.run(7);
    rig.hw.set_distance(1, Some(30.0));
    rig.run(8); // tick 15: channel 0 triggers, channel 1 at 8
    assert_eq!(rig.app.state_id(), StateId::Running);
    assert_eq!(rig.app.detection_count(1), Some(8));

    rig.hw.set_distance(0, None);
    rig.tick(); // tick 16, t = 3.0 s
    assert_eq!(rig.app.state_id(), StateId::Cooldown);
    assert_eq!(rig.app.detection_count(1), Some(9));

    rig.run(19); // t = 3.2 s .. 6.8 s
    assert_eq!(rig.app.detection_count(1), Some(9), "frozen during cooldown");

    let frame = rig.tick(); // t = 7.0 s
    assert_eq!(frame.to_string(), "(0.0, 30.0, 0)");
    assert_eq!(rig.app.state_id(), StateId::Idle);
    assert_eq!(rig.app.detection_count(1), Some(1));
    assert_eq!(rig.app.detection_count(0), Some(0));
}

#[test]
fn transitions_are_reported_in_order() {
    let mut rig = Rig::new(1);
    rig.hw.set_distance(0, Some(20.0));
    rig.run(15);
    rig.hw.set_distance(0, None);
    rig.run(21);

    let transitions: Vec<(StateId, StateId)> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (StateId::Idle, StateId::Running),
            (StateId::Running, StateId::Cooldown),
            (StateId::Cooldown, StateId::Idle),
        ]
    );
    assert_eq!(rig.sink.frames().len(), 36);
}
