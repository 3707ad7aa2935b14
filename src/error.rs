//! Unified error types for the GSMRemote firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! main loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the sweep and dispatcher without allocation.
//!
//! Nothing here is fatal: every error resolves to a logged no-op or, for
//! the watchdog faults, a modem power cycle.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A modem exchange failed.
    Modem(ModemError),
    /// A relay or sensor peripheral failed.
    Hardware(HardwareError),
    /// A watchdog condition tripped.
    Safety(SafetyFault),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modem(e) => write!(f, "modem: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Safety(e) => write!(f, "safety: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("stored config is not valid JSON"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Modem errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemError {
    /// No line arrived before the command deadline.
    Timeout,
    /// A line arrived but did not match the expected response.
    UnexpectedResponse,
    /// A line exceeded the response buffer and was delivered truncated.
    BufferOverflow,
    /// The serial transport reported a read or write failure.
    Serial,
    /// The power-key GPIO could not be driven.
    PowerKey,
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "response timeout"),
            Self::UnexpectedResponse => write!(f, "unexpected response"),
            Self::BufferOverflow => write!(f, "response buffer overflow"),
            Self::Serial => write!(f, "serial I/O failed"),
            Self::PowerKey => write!(f, "power key write failed"),
        }
    }
}

impl From<ModemError> for Error {
    fn from(e: ModemError) -> Self {
        Self::Modem(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// ADC read returned an error.
    AdcReadFailed,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
        }
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Conditions detected by the time-constraint sweep.  A single sweep can
/// raise several at once, so they are collected in a [`FaultSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// No successful registration within the bad-network hold time.
    NetworkUnhealthy = 0b0000_0001,
    /// No byte from the modem within the no-activity hold time.
    ModemSilence = 0b0000_0010,
    /// Relay has been on longer than the maximum on-duration.
    MaxOnDuration = 0b0000_0100,
    /// Supply voltage at or above the cutoff while the relay is on.
    OverVoltage = 0b0000_1000,
}

impl SafetyFault {
    pub const ALL: [SafetyFault; 4] = [
        Self::NetworkUnhealthy,
        Self::ModemSilence,
        Self::MaxOnDuration,
        Self::OverVoltage,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnhealthy => write!(f, "network unhealthy"),
            Self::ModemSilence => write!(f, "modem silent"),
            Self::MaxOnDuration => write!(f, "max on-duration exceeded"),
            Self::OverVoltage => write!(f, "supply over-voltage"),
        }
    }
}

impl From<SafetyFault> for Error {
    fn from(e: SafetyFault) -> Self {
        Self::Safety(e)
    }
}

/// Bitmask of faults raised by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultSet(u8);

impl FaultSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, fault: SafetyFault) {
        self.0 |= fault.mask();
    }

    pub fn contains(&self, fault: SafetyFault) -> bool {
        self.0 & fault.mask() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Faults in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = SafetyFault> + '_ {
        SafetyFault::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
