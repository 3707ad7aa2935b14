//! Output relay driver.
//!
//! Level-held: HIGH = external device powered, LOW = off.  The driver
//! is a dumb actuator; who may switch it is decided by the application
//! service (authorized calls turn it on or off, the sweep only turns it
//! off).

use embedded_hal::digital::OutputPin;
use log::info;

use crate::error::HardwareError;

pub struct RelayDriver<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take the pin and force the relay off.
    pub fn new(mut pin: P) -> Result<Self, HardwareError> {
        pin.set_low().map_err(|_| HardwareError::GpioWriteFailed)?;
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), HardwareError> {
        info!("Setting external device power state to: {}", if on { "ON" } else { "OFF" });
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        result.map_err(|_| HardwareError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
