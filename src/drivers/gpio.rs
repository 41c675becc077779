//! Numbered GPIO pin implementing the `embedded-hal` digital traits.
//!
//! Lets the sensor and pump drivers stay generic over
//! [`OutputPin`]/[`InputPin`] while the firmware binary hands them plain
//! pin numbers from [`SystemConfig`](crate::config::SystemConfig).
//! Direction is configured once by [`hw_init::init_pins`].

use embedded_hal::digital::{Error, ErrorKind, ErrorType, InputPin, OutputPin};

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError {
    pub pin: i32,
    pub rc: i32,
}

impl Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin(i32);

impl GpioPin {
    pub fn new(pin: i32) -> Self {
        Self(pin)
    }

    pub fn number(self) -> i32 {
        self.0
    }

    fn write(&self, high: bool) -> Result<(), GpioError> {
        match hw_init::gpio_write(self.0, high) {
            0 => Ok(()),
            rc => Err(GpioError { pin: self.0, rc }),
        }
    }
}

impl ErrorType for GpioPin {
    type Error = GpioError;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.0))
    }
}
