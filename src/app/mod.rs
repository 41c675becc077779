//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control rules for the pump controller:
//! tick orchestration, debouncing, and pacing.  All interaction with
//! hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod cadence;
pub mod events;
pub mod ports;
pub mod service;
