//! PumpSense Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  HardwareAdapter     PlotterSink     StaticConfig          │
//! │  (Sensor+Actuator)   (EventSink)     (ConfigPort)          │
//! │  SystemClock                                               │
//! │  (Clock)                                                   │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ──────────────        │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │          ControlLoop (pure logic)                │      │
//! │  │  Debouncers · FSM (Idle/Running/Cooldown)        │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  TickCadence (fixed period) · Watchdog                     │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use esp_idf_hal::delay::Delay;
use log::{error, info, warn};

use pumpsense::adapters::hardware::HardwareAdapter;
use pumpsense::adapters::plotter::PlotterSink;
use pumpsense::adapters::time::SystemClock;
use pumpsense::app::cadence::TickCadence;
use pumpsense::app::ports::{Clock, ConfigPort, StaticConfig};
use pumpsense::app::service::ControlLoop;
use pumpsense::config::SystemConfig;
use pumpsense::drivers::gpio::GpioPin;
use pumpsense::drivers::hw_init;
use pumpsense::drivers::pump::PumpDriver;
use pumpsense::drivers::watchdog::Watchdog;
use pumpsense::sensors::SensorHub;
use pumpsense::sensors::echo::GpioEchoCapture;
use pumpsense::sensors::ultrasonic::DistanceSensor;

const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PumpSense v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let source = match option_env!("PUMPSENSE_CONFIG_JSON") {
        Some(json) => StaticConfig::from_json(json.as_bytes()),
        None => StaticConfig::defaults(),
    };
    let config = match source.load() {
        Ok(c) => c,
        Err(e) => {
            warn!("config rejected ({}), running with defaults", e);
            SystemConfig::default()
        }
    };
    info!(
        "config: {} channel(s), threshold {} cm x {} cycles, pump max {} ms, cooldown {} ms",
        config.channel_count(),
        config.threshold_distance_cm,
        config.detection_cycles,
        config.pump_max_on_time_ms,
        config.pump_cooldown_ms
    );

    // ── 3. Pins (pump off, triggers low) ──────────────────────
    if let Err(e) = hw_init::init_pins(&config) {
        // Halt; the watchdog is not armed yet so the device stays safe.
        error!("GPIO init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 4. Hardware adapter ───────────────────────────────────
    let clock = SystemClock::new();
    let mut hub = SensorHub::new();
    for (id, ch) in config.channels.iter().enumerate() {
        let echo = GpioEchoCapture::new(GpioPin::new(ch.echo_gpio), clock);
        let sensor = DistanceSensor::new(id as u8, GpioPin::new(ch.trigger_gpio), echo, &config);
        if hub.add(sensor).is_err() {
            warn!("sensor hub full, channel {} dropped", id);
        }
    }
    let pump = PumpDriver::new(GpioPin::new(config.pump_gpio));
    let mut hw = HardwareAdapter::new(hub, pump, clock, Delay::new_default());
    let mut sink = PlotterSink::stdout();

    // ── 5. Control loop ───────────────────────────────────────
    let mut app = ControlLoop::new(&config);
    app.start(clock.now(), &mut hw, &mut sink);

    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT);
    let mut cadence = TickCadence::new(config.tick_period());
    let mut pacing = Delay::new_default();

    loop {
        let now = clock.now();
        cadence.begin(now);
        app.tick(now, &mut hw, &mut sink);
        cadence.wait(&clock, &mut pacing);
        watchdog.feed();
    }
}
