//! Fixed-period tick pacing.
//!
//! The control loop runs at a fixed target period measured from the
//! *start* of each tick, so measurement latency eats into the sleep
//! rather than stretching the period.  A tick that overruns its slot is
//! followed immediately by the next one; missed slots are not replayed.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::debug;

use super::ports::{Clock, Instant};

pub struct TickCadence {
    period: Duration,
    deadline: Option<Instant>,
    overruns: u32,
}

impl TickCadence {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
            overruns: 0,
        }
    }

    /// Mark the start of a tick at `now`.
    pub fn begin(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    /// Block until the current tick's slot ends.
    pub fn wait(&mut self, clock: &impl Clock, delay: &mut impl DelayNs) {
        let Some(deadline) = self.deadline.take() else {
            return;
        };

        let remaining = deadline.saturating_duration_since(clock.now());
        if remaining.is_zero() {
            self.overruns = self.overruns.saturating_add(1);
            debug!("tick overran its {} ms slot", self.period.as_millis());
            return;
        }

        delay.delay_us(u32::try_from(remaining.as_micros()).unwrap_or(u32::MAX));
    }

    /// Ticks that ran past their slot since startup.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}
