//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers; no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  IDLE ──[object detected]──▶ RUNNING
//!    ▲                            │
//!    │              [detection lost  OR  max on-time]
//!    │                            ▼
//!    └──────[cooldown elapsed]── COOLDOWN
//! ```
//!
//! Leaving Cooldown requests a reset of every channel's detection counter.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Running
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: Some(running_enter),
            on_exit: Some(running_exit),
            on_update: running_update,
        },
        // Index 2: Cooldown
        StateDescriptor {
            id: StateId::Cooldown,
            name: "Cooldown",
            on_enter: Some(cooldown_enter),
            on_exit: Some(cooldown_exit),
            on_update: cooldown_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.commands.pump_on = false;
    info!("IDLE: pump off, watching for presence");
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.object_detected {
        return Some(StateId::Running);
    }

    // Already off by invariant; re-asserted every tick.
    ctx.commands.pump_on = false;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING state: pump on, bounded by max on-time
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut FsmContext) {
    ctx.commands.pump_on = true;
    info!(
        "RUNNING: pump on (max {} ms)",
        ctx.max_on_time.as_millis()
    );
}

fn running_exit(ctx: &mut FsmContext) {
    ctx.commands.pump_on = false;
}

fn running_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.object_detected {
        info!(
            "RUNNING: presence lost after {} ms",
            ctx.time_in_state().as_millis()
        );
        return Some(StateId::Cooldown);
    }

    if ctx.time_in_state() >= ctx.max_on_time {
        warn!(
            "RUNNING: max on-time {} ms reached with presence still detected",
            ctx.max_on_time.as_millis()
        );
        return Some(StateId::Cooldown);
    }

    ctx.commands.pump_on = true;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLDOWN state: mandatory dead time, sensing suspended
// ═══════════════════════════════════════════════════════════════════════════

fn cooldown_enter(ctx: &mut FsmContext) {
    ctx.commands.pump_on = false;
    info!(
        "COOLDOWN: pump off, sensing suspended for {} ms",
        ctx.cooldown.as_millis()
    );
}

fn cooldown_exit(ctx: &mut FsmContext) {
    ctx.detection_reset_pending = true;
}

fn cooldown_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.commands.pump_on = false;

    if ctx.time_in_state() >= ctx.cooldown {
        return Some(StateId::Idle);
    }

    None
}
