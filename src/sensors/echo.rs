//! Polled echo-pulse capture on a plain GPIO input.
//!
//! Implements [`EchoCapture`] by sampling the echo line every time
//! [`poll_pulse`](EchoCapture::poll_pulse) is called and timestamping the
//! edges with a [`Clock`].  The sensor driver calls it in a tight loop
//! while waiting for the echo, so edge resolution is bounded by the
//! loop period (a few microseconds on an ESP32, ~0.02 cm).
//!
//! A rising edge only counts once the line has been seen low after
//! arming, so a line that was already high at arm time (tail of a stale
//! echo) is never measured as a short pulse.

use embedded_hal::digital::InputPin;
use log::trace;

use crate::app::ports::{Clock, EchoCapture, Instant};
use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disarmed,
    AwaitRise { seen_low: bool },
    High { since: Instant },
    Captured(u32),
}

pub struct GpioEchoCapture<I, C> {
    pin: I,
    clock: C,
    phase: Phase,
}

impl<I: InputPin, C: Clock> GpioEchoCapture<I, C> {
    pub fn new(pin: I, clock: C) -> Self {
        Self {
            pin,
            clock,
            phase: Phase::Disarmed,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.phase != Phase::Disarmed
    }
}

impl<I: InputPin, C: Clock> EchoCapture for GpioEchoCapture<I, C> {
    fn clear(&mut self) {
        if self.is_armed() {
            self.phase = Phase::AwaitRise { seen_low: false };
        }
    }

    fn arm(&mut self) {
        if !self.is_armed() {
            self.phase = Phase::AwaitRise { seen_low: false };
        }
    }

    fn disarm(&mut self) {
        self.phase = Phase::Disarmed;
    }

    fn poll_pulse(&mut self) -> Option<u32> {
        if let Phase::Captured(width_us) = self.phase {
            return Some(width_us);
        }
        if self.phase == Phase::Disarmed {
            return None;
        }

        // A failed sample is just a missed poll; the timeout bounds us.
        let Ok(high) = self.pin.is_high() else {
            trace!("{}", SensorError::EchoReadFailed);
            return None;
        };
        let now = self.clock.now();

        match self.phase {
            Phase::AwaitRise { seen_low } => {
                if !high {
                    self.phase = Phase::AwaitRise { seen_low: true };
                } else if seen_low {
                    self.phase = Phase::High { since: now };
                }
                None
            }
            Phase::High { since } => {
                if high {
                    return None;
                }
                let width_us = u32::try_from(now.saturating_duration_since(since).as_micros())
                    .unwrap_or(u32::MAX);
                self.phase = Phase::Captured(width_us);
                Some(width_us)
            }
            Phase::Disarmed | Phase::Captured(_) => None,
        }
    }
}
