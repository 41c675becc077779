//! Actuation control: the pump state machine facade.

pub mod pump;
