//! Hardware adapter: bridges the relay and the supply sensor to domain
//! port traits.
//!
//! Owns the [`RelayDriver`] and the [`BatterySensor`], exposing them
//! through [`RelayPort`] and [`SupplyPort`].  The modem has its own
//! engine ([`crate::modem::Modem`]); everything else the service touches
//! goes through here.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::{RelayPort, SupplyPort};
use crate::drivers::relay::RelayDriver;
use crate::error::HardwareError;
use crate::sensors::battery::BatterySensor;

/// Concrete adapter that combines the switch hardware behind port traits.
pub struct HardwareAdapter<P> {
    relay: RelayDriver<P>,
    battery: BatterySensor,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(relay: RelayDriver<P>, battery: BatterySensor) -> Self {
        Self { relay, battery }
    }

    pub fn relay_is_on(&self) -> bool {
        self.relay.is_on()
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<P: OutputPin> RelayPort for HardwareAdapter<P> {
    fn set_relay(&mut self, on: bool) -> Result<(), HardwareError> {
        self.relay.set(on)
    }
}

// ── SupplyPort implementation ─────────────────────────────────

impl<P: OutputPin> SupplyPort for HardwareAdapter<P> {
    fn supply_millivolts(&mut self) -> Result<u16, HardwareError> {
        let reading = self.battery.read()?;
        debug!("VBAT raw={} -> {} mV", reading.raw, reading.millivolts);
        Ok(reading.millivolts)
    }
}
