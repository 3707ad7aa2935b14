//! SIM800 PWRKEY driver.
//!
//! The power key idles HIGH.  Holding it LOW for longer than the modem's
//! minimum pulse width toggles the modem on or off; the modem gives no
//! indication of which, so callers treat every pulse as a cold restart.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::HardwareError;

pub struct PowerKey<P> {
    pin: P,
    pulses: u32,
}

impl<P: OutputPin> PowerKey<P> {
    /// Take the pin and drive it to its idle HIGH level.
    pub fn new(mut pin: P) -> Result<Self, HardwareError> {
        pin.set_high().map_err(|_| HardwareError::GpioWriteFailed)?;
        Ok(Self { pin, pulses: 0 })
    }

    /// Hold the key LOW for `low_ms`, then release it.
    pub fn pulse(&mut self, delay: &mut impl DelayNs, low_ms: u32) -> Result<(), HardwareError> {
        self.pin.set_low().map_err(|_| HardwareError::GpioWriteFailed)?;
        delay.delay_ms(low_ms);
        self.pin.set_high().map_err(|_| HardwareError::GpioWriteFailed)?;
        self.pulses = self.pulses.wrapping_add(1);
        Ok(())
    }

    /// Pulses issued since boot.
    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }
}
