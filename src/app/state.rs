//! Shared switch state.
//!
//! One explicitly owned struct instead of sketch-style globals.  The
//! [`AppService`](super::service::AppService) owns it and hands out
//! `&mut` only to the component allowed to write each field:
//!
//! | Field     | Writers                                    | Readers |
//! |-----------|--------------------------------------------|---------|
//! | `network` | network monitor, sweep (reset after cycle) | sweep   |
//! | `relay`   | call controller, sweep (force off)         | sweep   |

use super::ports::elapsed_ms;

/// Last time the modem reported a home-network registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkHealth {
    last_good_ms: u64,
}

impl NetworkHealth {
    pub fn new(now_ms: u64) -> Self {
        Self { last_good_ms: now_ms }
    }

    pub fn mark_good(&mut self, now_ms: u64) {
        self.last_good_ms = now_ms;
    }

    pub fn last_good_ms(&self) -> u64 {
        self.last_good_ms
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        elapsed_ms(now_ms, self.last_good_ms)
    }
}

/// Relay level plus the time of the last off → on transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayState {
    on: bool,
    on_since_ms: u64,
}

impl RelayState {
    pub fn off() -> Self {
        Self {
            on: false,
            on_since_ms: 0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn on_since_ms(&self) -> u64 {
        self.on_since_ms
    }

    /// How long the relay has been on, or `None` while it is off.
    pub fn on_for_ms(&self, now_ms: u64) -> Option<u64> {
        self.on.then(|| elapsed_ms(now_ms, self.on_since_ms))
    }

    /// Record a transition.  Only switching on moves the on-stamp.
    pub(crate) fn record(&mut self, on: bool, now_ms: u64) {
        if on && !self.on {
            self.on_since_ms = now_ms;
        }
        self.on = on;
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::off()
    }
}

/// Everything the watchdog sweep reads.
#[derive(Debug, Clone, Copy)]
pub struct SwitchState {
    pub network: NetworkHealth,
    pub relay: RelayState,
}

impl SwitchState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            network: NetworkHealth::new(now_ms),
            relay: RelayState::off(),
        }
    }
}
