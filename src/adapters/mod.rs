//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                     |
//! |------------|---------------|---------------------------------|
//! | `hardware` | SensorPort    | Ultrasonic sensors over GPIO    |
//! |            | ActuatorPort  | Pump output pin                 |
//! | `plotter`  | EventSink     | Serial console (plotter tuples) |
//! | `time`     | Clock         | ESP32 high-resolution timer     |
//!
//! Configuration comes from [`StaticConfig`](crate::app::ports::StaticConfig),
//! which lives next to the port it implements.

pub mod hardware;
pub mod plotter;
pub mod time;
