//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensor channels, the pump, the telemetry sink, the
//! clock) implement these traits.  The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every timing path can be driven by a fake clock in tests.

use core::ops::Add;
use core::time::Duration;

use crate::config::SystemConfig;
use crate::sensors::Distance;

// ───────────────────────────────────────────────────────────────
// Monotonic time
// ───────────────────────────────────────────────────────────────

/// A point on the monotonic clock, in microseconds since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant(u64);

impl Instant {
    pub const fn from_micros(us: u64) -> Self {
        Self(us)
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_duration_since(self, earlier: Instant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        let us = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Instant(self.0.saturating_add(us))
    }
}

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

// ───────────────────────────────────────────────────────────────
// Echo capture (driven adapter: sensor echo line → domain)
// ───────────────────────────────────────────────────────────────

/// Single-pulse capture on an ultrasonic echo line.
///
/// Lifecycle per measurement: `clear` → `arm` → `poll_pulse` (repeatedly,
/// bounded by the caller's timeout) → `disarm`.  A capture must accept
/// `arm` again after `disarm`.
pub trait EchoCapture {
    /// Drop any pulse captured by a previous measurement.
    fn clear(&mut self);

    /// Start listening for one pulse.
    fn arm(&mut self);

    /// Stop listening.
    fn disarm(&mut self);

    /// Width of the captured pulse in microseconds, once a complete pulse
    /// has been seen since the last `arm`.
    fn poll_pulse(&mut self) -> Option<u32>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to measure each channel.
pub trait SensorPort {
    /// Number of physical channels behind this port.
    fn channel_count(&self) -> usize;

    /// Run one bounded measurement on `channel`.  `None` means no echo
    /// arrived in time (or the channel does not exist).
    fn measure(&mut self, channel: usize) -> Option<Distance>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the pump.
pub trait ActuatorPort {
    /// Drive the pump output on or off.
    fn set_pump(&mut self, on: bool);

    /// Force every output into its safe state (pump off, triggers low).
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial plotter,
/// log, test capture).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (startup only)
// ───────────────────────────────────────────────────────────────

/// Supplies the configuration the control loop is built from.
///
/// Called once before the loop starts; there is no reload path.
/// Implementations MUST return a config that passes
/// [`SystemConfig::validate`].
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

/// Compiled-in defaults, optionally overridden by a JSON blob baked into
/// the firmware image.
pub struct StaticConfig {
    json: Option<&'static [u8]>,
}

impl StaticConfig {
    pub const fn defaults() -> Self {
        Self { json: None }
    }

    pub const fn from_json(json: &'static [u8]) -> Self {
        Self { json: Some(json) }
    }
}

impl ConfigPort for StaticConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match self.json {
            Some([]) => Err(ConfigError::NotFound),
            Some(bytes) => SystemConfig::from_json(bytes),
            None => {
                let config = SystemConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found.
    NotFound,
    /// Config blob failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::NotFound => Self::Config("not found"),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
