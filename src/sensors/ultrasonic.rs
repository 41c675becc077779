//! HC-SR04 style ultrasonic distance sensor driver.
//!
//! One measurement: clear the echo capture, send a short trigger pulse,
//! arm the capture and busy-wait (bounded) for a single echo pulse.  The
//! pulse width is the round-trip time of flight:
//!
//! ```text
//!   distance_cm = pulse_us × speed_of_sound_cm_per_us / 2
//! ```
//!
//! A timeout is not an error, just "nothing in range": the driver returns
//! `None` and the caller treats it like any out-of-range reading.  The
//! echo capture is always left disarmed so the next tick starts clean.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::app::ports::{Clock, EchoCapture};
use crate::config::SystemConfig;
use crate::error::{Error, SensorError};

use super::Distance;

/// Per-channel ultrasonic sensor: owns its trigger pin and echo capture.
pub struct DistanceSensor<T, E> {
    id: u8,
    trigger: T,
    echo: E,
    trigger_pulse_us: u32,
    echo_timeout: Duration,
    speed_of_sound_cm_per_us: f32,
}

impl<T: OutputPin, E: EchoCapture> DistanceSensor<T, E> {
    pub fn new(id: u8, trigger: T, echo: E, config: &SystemConfig) -> Self {
        Self {
            id,
            trigger,
            echo,
            trigger_pulse_us: config.trigger_pulse_us,
            echo_timeout: config.echo_timeout(),
            speed_of_sound_cm_per_us: config.speed_of_sound_cm_per_us,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Run one bounded measurement.
    pub fn measure(&mut self, clock: &impl Clock, delay: &mut impl DelayNs) -> Option<Distance> {
        self.echo.clear();

        if let Err(e) = self.fire_trigger(delay) {
            warn!("sensor {}: {}", self.id, Error::from(e));
            return None;
        }

        self.echo.arm();
        let deadline = clock.now() + self.echo_timeout;
        let pulse = loop {
            if let Some(width_us) = self.echo.poll_pulse() {
                break Some(width_us);
            }
            if clock.now() > deadline {
                break None;
            }
        };
        self.echo.disarm();

        match pulse {
            Some(width_us) => self.pulse_to_distance(width_us),
            None => {
                debug!("sensor {}: {}", self.id, SensorError::EchoTimeout);
                None
            }
        }
    }

    /// Trigger low, capture disarmed and empty.
    pub fn idle(&mut self) {
        if self.trigger.set_low().is_err() {
            warn!("sensor {}: {}", self.id, Error::from(SensorError::TriggerWriteFailed));
        }
        self.echo.disarm();
        self.echo.clear();
    }

    /// Convert a round-trip echo width to a one-way distance.
    pub fn pulse_to_distance(&self, width_us: u32) -> Option<Distance> {
        Distance::from_cm(width_us as f32 * self.speed_of_sound_cm_per_us / 2.0)
    }

    fn fire_trigger(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.trigger
            .set_high()
            .map_err(|_| SensorError::TriggerWriteFailed)?;
        delay.delay_us(self.trigger_pulse_us);
        self.trigger
            .set_low()
            .map_err(|_| SensorError::TriggerWriteFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::Instant;
    use core::cell::Cell;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    /// Clock that advances by `step_us` every time it is read.
    struct SteppingClock {
        now_us: Cell<u64>,
        step_us: u64,
    }

    impl SteppingClock {
        fn new(step_us: u64) -> Self {
            Self { now_us: Cell::new(0), step_us }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Instant {
            let now = self.now_us.get();
            self.now_us.set(now + self.step_us);
            Instant::from_micros(now)
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[derive(Default)]
    struct MockTrigger {
        high: bool,
        pulses: u32,
        broken: bool,
    }

    impl ErrorType for MockTrigger {
        type Error = PinFault;
    }

    impl OutputPin for MockTrigger {
        fn set_low(&mut self) -> Result<(), PinFault> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), PinFault> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = true;
            self.pulses += 1;
            Ok(())
        }
    }

    /// Echo that yields `pulse` after `polls_before_pulse` polls.
    #[derive(Default)]
    struct ScriptedEcho {
        pulse: Option<u32>,
        polls_before_pulse: u32,
        polls: u32,
        armed: bool,
        cleared: u32,
    }

    impl EchoCapture for ScriptedEcho {
        fn clear(&mut self) {
            self.cleared += 1;
            self.polls = 0;
        }

        fn arm(&mut self) {
            self.armed = true;
        }

        fn disarm(&mut self) {
            self.armed = false;
        }

        fn poll_pulse(&mut self) -> Option<u32> {
            assert!(self.armed, "polled while disarmed");
            self.polls += 1;
            if self.polls > self.polls_before_pulse {
                self.pulse
            } else {
                None
            }
        }
    }

    fn make(echo: ScriptedEcho) -> DistanceSensor<MockTrigger, ScriptedEcho> {
        DistanceSensor::new(0, MockTrigger::default(), echo, &SystemConfig::default())
    }

    #[test]
    fn converts_round_trip_width() {
        let mut sensor = make(ScriptedEcho {
            pulse: Some(1166),
            ..Default::default()
        });
        let clock = SteppingClock::new(10);
        let mut delay = RecordingDelay::default();

        let d = sensor.measure(&clock, &mut delay).unwrap();
        assert!((d.cm() - 1166.0 * 0.0343 / 2.0).abs() < 1e-3);
        assert!((d.cm() - 20.0).abs() < 0.1);
    }

    #[test]
    fn trigger_pulse_is_ten_microseconds_and_ends_low() {
        let mut sensor = make(ScriptedEcho {
            pulse: Some(500),
            ..Default::default()
        });
        let clock = SteppingClock::new(10);
        let mut delay = RecordingDelay::default();
        sensor.measure(&clock, &mut delay);

        assert_eq!(delay.total_ns, 10_000);
        assert_eq!(sensor.trigger.pulses, 1);
        assert!(!sensor.trigger.high);
    }

    #[test]
    fn timeout_returns_none_and_disarms() {
        let mut sensor = make(ScriptedEcho::default());
        let clock = SteppingClock::new(1_000);
        let mut delay = RecordingDelay::default();

        assert!(sensor.measure(&clock, &mut delay).is_none());
        assert!(!sensor.echo.armed);
        // 50 ms budget at 1 ms per clock read: bounded, not stuck.
        assert!(sensor.echo.polls >= 50 && sensor.echo.polls <= 52);
    }

    #[test]
    fn late_pulse_within_budget_is_accepted() {
        let mut sensor = make(ScriptedEcho {
            pulse: Some(600),
            polls_before_pulse: 40,
            ..Default::default()
        });
        let clock = SteppingClock::new(1_000);
        let mut delay = RecordingDelay::default();

        assert!(sensor.measure(&clock, &mut delay).is_some());
        assert!(!sensor.echo.armed);
    }

    #[test]
    fn stale_capture_is_cleared_every_measurement() {
        let mut sensor = make(ScriptedEcho {
            pulse: Some(600),
            ..Default::default()
        });
        let clock = SteppingClock::new(10);
        let mut delay = RecordingDelay::default();
        sensor.measure(&clock, &mut delay);
        sensor.measure(&clock, &mut delay);
        assert_eq!(sensor.echo.cleared, 2);
    }

    #[test]
    fn zero_width_pulse_is_absent() {
        let mut sensor = make(ScriptedEcho {
            pulse: Some(0),
            ..Default::default()
        });
        let clock = SteppingClock::new(10);
        let mut delay = RecordingDelay::default();
        assert!(sensor.measure(&clock, &mut delay).is_none());
    }

    #[test]
    fn broken_trigger_reads_absent_without_arming() {
        let mut sensor = DistanceSensor::new(
            1,
            MockTrigger {
                broken: true,
                ..Default::default()
            },
            ScriptedEcho {
                pulse: Some(600),
                ..Default::default()
            },
            &SystemConfig::default(),
        );
        let clock = SteppingClock::new(10);
        let mut delay = RecordingDelay::default();
        assert!(sensor.measure(&clock, &mut delay).is_none());
        assert_eq!(sensor.echo.polls, 0);
    }

    #[test]
    fn idle_drives_trigger_low() {
        let mut sensor = make(ScriptedEcho::default());
        sensor.trigger.high = true;
        sensor.echo.armed = true;
        sensor.idle();
        assert!(!sensor.trigger.high);
        assert!(!sensor.echo.armed);
    }
}
