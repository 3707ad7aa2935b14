//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART0 in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | gsm remote switch running");
            }
            AppEvent::RelaySwitched { on, cause } => {
                info!("RELAY | {} ({:?})", if *on { "ON" } else { "OFF" }, cause);
            }
            AppEvent::ModemPowerCycled(cause) => {
                info!("MODEM | power toggled ({:?})", cause);
            }
            AppEvent::NetworkStatus {
                registration,
                healthy,
            } => match registration {
                Some(n) => info!("NET | creg={} {}", n, if *healthy { "OK" } else { "BAD" }),
                None => warn!("NET | no registration response"),
            },
            AppEvent::UnauthorizedCaller(number) => {
                warn!("CALL | unauthorized caller '{}'", number);
            }
            AppEvent::UnhandledLine(line) => {
                info!("MODEM | unhandled '{}'", line);
            }
            AppEvent::FaultDetected(faults) => {
                warn!("FAULT | detected, flags=0b{:08b}", faults.bits());
            }
            AppEvent::TaskToggled { task, enabled } => {
                info!(
                    "TASK | {:?} {}",
                    task,
                    if *enabled { "enabled" } else { "disabled" }
                );
            }
        }
    }
}
