//! Pump actuation controller.
//!
//! Thin facade over the [`Fsm`] that turns the aggregated presence flag
//! and the monotonic clock into a pump command.  The run length is capped
//! and every run is followed by a mandatory cooldown:
//!
//! | From     | Condition                              | To       |
//! |----------|----------------------------------------|----------|
//! | Idle     | object detected                        | Running  |
//! | Running  | detection lost, or max on-time reached | Cooldown |
//! | Cooldown | cooldown elapsed                       | Idle     |
//!
//! Only this controller decides whether the pump runs.

use crate::app::ports::Instant;
use crate::config::SystemConfig;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

/// Externally visible pump state, with the time each timed state began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Running { started_at: Instant },
    Cooldown { started_at: Instant },
}

/// Outcome of one [`PumpController::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpStep {
    /// `(from, to)` if the machine changed state this step.
    pub transition: Option<(StateId, StateId)>,
    /// Every channel's detection counter must be zeroed.
    pub reset_detection: bool,
}

pub struct PumpController {
    fsm: Fsm,
    ctx: FsmContext,
}

impl PumpController {
    /// Build the controller in `Idle`.  Call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(config),
        }
    }

    /// Enter the initial state at `now` (pump off).
    pub fn start(&mut self, now: Instant) {
        self.ctx.now = now;
        self.fsm.start(&mut self.ctx);
    }

    /// Evaluate the transition table once.
    ///
    /// `object_detected` is ignored while in Cooldown.
    pub fn update(&mut self, object_detected: bool, now: Instant) -> PumpStep {
        self.ctx.now = now;
        self.ctx.object_detected = object_detected;

        let transition = self.fsm.tick(&mut self.ctx);
        let reset_detection = core::mem::take(&mut self.ctx.detection_reset_pending);

        PumpStep {
            transition,
            reset_detection,
        }
    }

    pub fn state(&self) -> PumpState {
        let started_at = self.fsm.entered_at();
        match self.fsm.current_state() {
            StateId::Idle => PumpState::Idle,
            StateId::Running => PumpState::Running { started_at },
            StateId::Cooldown => PumpState::Cooldown { started_at },
        }
    }

    pub fn state_id(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn in_cooldown(&self) -> bool {
        self.state_id() == StateId::Cooldown
    }

    /// Commanded pump output after the last update.
    pub fn pump_on(&self) -> bool {
        self.ctx.commands.pump_on
    }
}
