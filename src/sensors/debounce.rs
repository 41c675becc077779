//! Consecutive-hit presence filter.
//!
//! Ultrasonic sensors glitch: a single reflection off a wall or a missed
//! echo produces a one-sample spike.  The debouncer only asserts
//! "detected" after `cycles` consecutive in-range readings, and any miss
//! drops it straight back to zero.  No averaging of the distance itself.
//!
//! ```text
//!   reading in (0, threshold) ──▶ count += 1
//!   anything else             ──▶ count  = 0
//!   detected                  ⇔  count >= cycles
//! ```

use crate::config::SystemConfig;

use super::Distance;

/// Per-channel detection filter.
#[derive(Debug, Clone)]
pub struct DetectionDebouncer {
    threshold_cm: f32,
    cycles: u16,
    count: u16,
}

impl DetectionDebouncer {
    pub fn new(threshold_cm: f32, cycles: u16) -> Self {
        Self {
            threshold_cm,
            cycles,
            count: 0,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.threshold_distance_cm, config.detection_cycles)
    }

    /// Feed one reading and return the stable detection state.
    pub fn update(&mut self, reading: Option<Distance>) -> bool {
        if self.in_range(reading) {
            self.count = self.count.saturating_add(1);
        } else {
            self.count = 0;
        }
        self.detected()
    }

    /// `0 < d < threshold`.  Absent readings never qualify.
    pub fn in_range(&self, reading: Option<Distance>) -> bool {
        reading.is_some_and(|d| d.cm() > 0.0 && d.cm() < self.threshold_cm)
    }

    pub fn detected(&self) -> bool {
        self.count >= self.cycles
    }

    /// Consecutive in-range readings seen so far.
    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
