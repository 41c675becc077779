//! One-shot GPIO initialisation plus raw pin access.
//!
//! Configures every trigger pin and the pump pin as push-pull outputs
//! driven low, and every echo pin as an input with pull-down, using raw
//! ESP-IDF sys calls.  Called once from `main()` before the control loop
//! starts.
//!
//! On host builds the pins live in an in-memory level table so the GPIO
//! layer and its tests run without hardware.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::config::SystemConfig;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot pin initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed { pin: i32, rc: i32 },
    InvalidPin(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, rc } => {
                write!(f, "GPIO{} config failed (rc={})", pin, rc)
            }
            Self::InvalidPin(pin) => write!(f, "GPIO{} out of range", pin),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(match e {
            HwInitError::GpioConfigFailed { .. } => "gpio_config rejected a pin",
            HwInitError::InvalidPin(_) => "GPIO number out of range",
        })
    }
}

/// Highest GPIO number + 1 addressable through the 64-bit pin mask.
pub const GPIO_COUNT: i32 = 64;

fn check_pin(pin: i32) -> Result<(), HwInitError> {
    if (0..GPIO_COUNT).contains(&pin) {
        Ok(())
    } else {
        Err(HwInitError::InvalidPin(pin))
    }
}

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_pins(config: &SystemConfig) -> Result<(), HwInitError> {
    use log::info;

    for ch in config.channels.iter() {
        // SAFETY: called once from main() before the loop; single-threaded.
        unsafe {
            configure_output(ch.trigger_gpio)?;
            configure_input(ch.echo_gpio)?;
        }
    }
    unsafe { configure_output(config.pump_gpio)? };

    info!(
        "hw_init: {} sensor channel(s) + pump on GPIO{} configured",
        config.channels.len(),
        config.pump_gpio
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_pins(config: &SystemConfig) -> Result<(), HwInitError> {
    for ch in config.channels.iter() {
        check_pin(ch.trigger_gpio)?;
        check_pin(ch.echo_gpio)?;
        gpio_write(ch.trigger_gpio, false);
        gpio_write(ch.echo_gpio, false);
    }
    check_pin(config.pump_gpio)?;
    gpio_write(config.pump_gpio, false);

    log::info!("hw_init(sim): {} channel(s) reset low", config.channels.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn configure_output(pin: i32) -> Result<(), HwInitError> {
    check_pin(pin)?;
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed { pin, rc: ret });
    }
    unsafe { gpio_set_level(pin, 0) };
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn configure_input(pin: i32) -> Result<(), HwInitError> {
    check_pin(pin)?;
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed { pin, rc: ret });
    }
    Ok(())
}

// ── Raw pin access ────────────────────────────────────────────

/// Drive an output pin.  Returns the ESP-IDF status code (0 on success).
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> i32 {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe { gpio_set_level(pin, u32::from(high)) }
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, Ordering};

    use super::GPIO_COUNT;

    static LEVELS: [AtomicBool; GPIO_COUNT as usize] =
        [const { AtomicBool::new(false) }; GPIO_COUNT as usize];

    pub fn set(pin: i32, high: bool) -> bool {
        match usize::try_from(pin).ok().and_then(|i| LEVELS.get(i)) {
            Some(level) => {
                level.store(high, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn get(pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|i| LEVELS.get(i))
            .is_some_and(|level| level.load(Ordering::Relaxed))
    }
}

/// Drive a simulated pin.  Returns `-1` for an out-of-range pin.
#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> i32 {
    if sim::set(pin, high) { 0 } else { -1 }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::get(pin)
}
