//! GPIO, actuator drivers, and one-shot hardware initialisation.

pub mod gpio;
pub mod hw_init;
pub mod pump;
pub mod watchdog;
