//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the aggregated detection input, the current time, the
//! pump command output, and the timing limits.  Think of it as the
//! "blackboard" in a blackboard architecture.

use core::time::Duration;

use crate::app::ports::Instant;
use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by the control loop)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuator actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorCommands {
    /// Desired pump output.
    pub pump_on: bool,
}

impl ActuatorCommands {
    /// Pump off.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic time of the tick being evaluated.
    pub now: Instant,
    /// When the current state was entered.  Maintained by the engine.
    pub state_entered_at: Instant,

    // -- Inputs --
    /// Logical OR of every channel's debounced detection flag.
    pub object_detected: bool,

    // -- Outputs --
    /// Commands to be applied to actuators after the FSM tick.
    pub commands: ActuatorCommands,
    /// Set when every channel's detection counter must be zeroed.
    /// Consumed (and cleared) by the control loop.
    pub detection_reset_pending: bool,

    // -- Limits --
    pub max_on_time: Duration,
    pub cooldown: Duration,
}

impl FsmContext {
    /// Create a new context with the limits from `config`.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            now: Instant::default(),
            state_entered_at: Instant::default(),
            object_detected: false,
            commands: ActuatorCommands::all_off(),
            detection_reset_pending: false,
            max_on_time: config.pump_max_on_time(),
            cooldown: config.pump_cooldown(),
        }
    }

    /// Time spent in the current state as of `now`.
    pub fn time_in_state(&self) -> Duration {
        self.now.saturating_duration_since(self.state_entered_at)
    }
}
