//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, forward over a
//! debug link, record in tests.

use crate::error::FaultSet;
use crate::modem::at::CallerId;
use crate::modem::framer::Line;
use crate::scheduler::TaskId;

/// Why the relay changed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCause {
    AuthorizedCall,
    MaxOnDuration,
    OverVoltage,
}

/// Why the modem was power cycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCycleCause {
    /// Initial power-on at boot.
    Boot,
    /// The time-constraint sweep found a network or silence fault.
    Watchdog(FaultSet),
    /// The modem announced `NORMAL POWER DOWN`.
    PowerDownBanner,
    /// Operator request on the debug console.
    Console,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// The relay changed level.
    RelaySwitched { on: bool, cause: RelayCause },

    /// The modem power key was pulsed.
    ModemPowerCycled(PowerCycleCause),

    /// Result of one registration poll.
    NetworkStatus { registration: Option<u8>, healthy: bool },

    /// A call from a number other than the authorized one.
    UnauthorizedCaller(CallerId),

    /// An unsolicited line no handler recognised.
    UnhandledLine(Line),

    /// One or more watchdog conditions tripped in a sweep.
    FaultDetected(FaultSet),

    /// A scheduled task was enabled or disabled.
    TaskToggled { task: TaskId, enabled: bool },
}
