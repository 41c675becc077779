//! System configuration parameters.
//!
//! Every tunable of the controller lives here.  The values are fixed for
//! the lifetime of the control loop: they are loaded once at startup
//! (compiled defaults or a JSON blob) and validated before use.

use core::time::Duration;

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins::{self, MAX_CHANNELS};

/// Trigger/echo GPIO pair for one ultrasonic sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPins {
    pub trigger_gpio: i32,
    pub echo_gpio: i32,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Detection ---
    /// A reading strictly below this distance (and above zero) counts as a hit.
    pub threshold_distance_cm: f32,
    /// Consecutive hits required before a channel reports detection.
    pub detection_cycles: u16,

    // --- Pump ---
    /// Hard cap on a single pump run (milliseconds).
    pub pump_max_on_time_ms: u32,
    /// Mandatory dead time after every run (milliseconds).
    pub pump_cooldown_ms: u32,

    // --- Timing ---
    /// Control loop period (milliseconds).
    pub measurement_interval_ms: u32,
    /// Width of the trigger pulse sent to each sensor (microseconds).
    pub trigger_pulse_us: u32,
    /// Maximum wait for an echo pulse (milliseconds).
    pub echo_timeout_ms: u32,

    // --- Physics ---
    /// Speed of sound used for pulse-width conversion (cm per microsecond).
    pub speed_of_sound_cm_per_us: f32,

    // --- Wiring ---
    pub pump_gpio: i32,
    /// Sensor channels, measured in this order every tick.
    pub channels: Vec<ChannelPins, MAX_CHANNELS>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        for (trigger_gpio, echo_gpio) in [
            (pins::SENSOR_1_TRIG_GPIO, pins::SENSOR_1_ECHO_GPIO),
            (pins::SENSOR_2_TRIG_GPIO, pins::SENSOR_2_ECHO_GPIO),
            (pins::SENSOR_3_TRIG_GPIO, pins::SENSOR_3_ECHO_GPIO),
        ] {
            // Three entries always fit in MAX_CHANNELS.
            let _ = channels.push(ChannelPins {
                trigger_gpio,
                echo_gpio,
            });
        }

        Self {
            // Detection
            threshold_distance_cm: 40.0,
            detection_cycles: 15, // ~3 s at 5 Hz

            // Pump
            pump_max_on_time_ms: 20_000,
            pump_cooldown_ms: 4_000,

            // Timing
            measurement_interval_ms: 200, // 5 Hz
            trigger_pulse_us: 10,
            echo_timeout_ms: 50,

            // Physics
            speed_of_sound_cm_per_us: 0.0343,

            // Wiring
            pump_gpio: pins::PUMP_GPIO,
            channels,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON config blob and validate it.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the control loop unsafe or meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::ValidationFailed("at least one sensor channel required"));
        }
        if !self.threshold_distance_cm.is_finite() || self.threshold_distance_cm <= 0.0 {
            return Err(ConfigError::ValidationFailed("threshold_distance_cm must be > 0"));
        }
        if self.detection_cycles == 0 {
            return Err(ConfigError::ValidationFailed("detection_cycles must be >= 1"));
        }
        if self.pump_max_on_time_ms == 0 {
            return Err(ConfigError::ValidationFailed("pump_max_on_time_ms must be > 0"));
        }
        if self.measurement_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("measurement_interval_ms must be > 0"));
        }
        if self.echo_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("echo_timeout_ms must be > 0"));
        }
        if !self.speed_of_sound_cm_per_us.is_finite() || self.speed_of_sound_cm_per_us <= 0.0 {
            return Err(ConfigError::ValidationFailed("speed_of_sound_cm_per_us must be > 0"));
        }

        let mut used: Vec<i32, { 2 * MAX_CHANNELS + 1 }> = Vec::new();
        let all = core::iter::once(self.pump_gpio).chain(
            self.channels
                .iter()
                .flat_map(|c| [c.trigger_gpio, c.echo_gpio]),
        );
        for gpio in all {
            if used.contains(&gpio) {
                return Err(ConfigError::ValidationFailed("GPIO assigned twice"));
            }
            // Capacity is exactly pump + two pins per channel.
            let _ = used.push(gpio);
        }

        Ok(())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.measurement_interval_ms as u64)
    }

    pub fn pump_max_on_time(&self) -> Duration {
        Duration::from_millis(self.pump_max_on_time_ms as u64)
    }

    pub fn pump_cooldown(&self) -> Duration {
        Duration::from_millis(self.pump_cooldown_ms as u64)
    }

    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms as u64)
    }
}
