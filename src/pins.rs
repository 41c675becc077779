//! GPIO pin assignments for the PumpSense controller board.
//!
//! Single source of truth for the default wiring: `SystemConfig::default()`
//! builds its channel map from these constants rather than hard-coding
//! pin numbers.

// ---------------------------------------------------------------------------
// Pump relay / MOSFET gate
// ---------------------------------------------------------------------------

/// Digital output: HIGH = pump running.
pub const PUMP_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Ultrasonic sensors (HC-SR04 style: trigger out, echo in)
// ---------------------------------------------------------------------------

/// Sensor 1 trigger output.
pub const SENSOR_1_TRIG_GPIO: i32 = 2;
/// Sensor 1 echo input.
pub const SENSOR_1_ECHO_GPIO: i32 = 3;

/// Sensor 2 trigger output.
pub const SENSOR_2_TRIG_GPIO: i32 = 4;
/// Sensor 2 echo input.
pub const SENSOR_2_ECHO_GPIO: i32 = 5;

/// Sensor 3 trigger output.
pub const SENSOR_3_TRIG_GPIO: i32 = 6;
/// Sensor 3 echo input.
pub const SENSOR_3_ECHO_GPIO: i32 = 7;

/// Upper bound on configured sensor channels.  Sizes every fixed-capacity
/// per-channel collection in the crate.
pub const MAX_CHANNELS: usize = 8;
