//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (modem, relay, supply sense, event sinks, clock)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::{HardwareError, ModemError};
use crate::modem::framer::Line;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds from `since` to `now`.  A `since` in the future (clock
/// wrap or a stamp taken from another source) counts as zero elapsed.
pub fn elapsed_ms(now: u64, since: u64) -> u64 {
    now.saturating_sub(since)
}

// ───────────────────────────────────────────────────────────────
// Modem port (driven adapter: domain ↔ SIM800)
// ───────────────────────────────────────────────────────────────

/// Line-level access to the modem.
///
/// Every wait behind this trait is bounded.  Callers must not have a
/// second command in flight.
pub trait ModemPort {
    /// Current time on the modem's clock.
    fn now_ms(&self) -> u64;

    /// Read whatever bytes are available and return a line if one
    /// completed.  Never blocks.
    fn poll_line(&mut self) -> Result<Option<Line>, ModemError>;

    /// Send a command line and discard whatever comes back during the
    /// settle window.
    fn send_command(&mut self, cmd: &str) -> Result<(), ModemError>;

    /// Send a command line and wait up to `timeout_ms` for the next line.
    fn send_and_await(&mut self, cmd: &str, timeout_ms: u32) -> Result<Line, ModemError>;

    /// Send a command line and require the response to equal `expected`.
    fn send_and_verify(
        &mut self,
        cmd: &str,
        expected: &str,
        timeout_ms: u32,
    ) -> Result<(), ModemError> {
        let line = self.send_and_await(cmd, timeout_ms)?;
        if line.as_str() == expected {
            Ok(())
        } else {
            log::warn!("Modem: '{}' answered '{}', expected '{}'", cmd, line, expected);
            Err(ModemError::UnexpectedResponse)
        }
    }

    /// Pulse the power key and reset the activity clock.
    fn toggle_power(&mut self) -> Result<(), ModemError>;

    /// Time since the modem last sent a byte.
    fn millis_since_activity(&self) -> u64;

    /// Forward a raw byte (debug passthrough).
    fn write_byte(&mut self, byte: u8) -> Result<(), ModemError>;

    /// Bounded blocking pause.
    fn pause_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait RelayPort {
    /// Drive the relay.  `true` powers the external device.
    fn set_relay(&mut self, on: bool) -> Result<(), HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Supply sense port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SupplyPort {
    /// Measured supply voltage in millivolts.
    fn supply_millivolts(&mut self) -> Result<u16, HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
