//! Call authorization and relay control.
//!
//! An incoming call from the authorized number inverts the relay and is
//! then hung up.  A single `ATH` is not always enough: the modem can
//! deliver another `+CLIP` for the same call, so the hang-up is repeated
//! under a [`RetryPolicy`].  Calls from anyone else are logged and left
//! to ring out; hanging up on them would only add modem traffic.

use log::{info, warn};

use crate::app::ports::{ModemPort, RelayPort};
use crate::app::state::RelayState;
use crate::config::SystemConfig;
use crate::error::HardwareError;
use crate::modem::at::{self, CallerId, IncomingCaller};

/// Fixed-count repetition with a pause after every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u8,
    pub pause_ms: u32,
}

impl RetryPolicy {
    pub fn new(attempts: u8, pause_ms: u32) -> Self {
        Self { attempts, pause_ms }
    }

    /// The pause following each attempt, one item per attempt.
    pub fn pauses(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.attempts).map(|_| self.pause_ms)
    }

}

/// What an incoming call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Authorized: the relay now has level `on`.
    Toggled { on: bool },
    /// Authorized, but the relay could not be driven.
    RelayFailed(HardwareError),
    /// Not the authorized number; nothing changed.
    Unauthorized,
}

pub struct CallController {
    authorized: CallerId,
    hangup: RetryPolicy,
}

impl CallController {
    pub fn new(config: &SystemConfig) -> Self {
        let mut authorized = CallerId::new();
        // Same capacity on both sides.
        let _ = authorized.push_str(&config.authorized_number);
        Self {
            authorized,
            hangup: RetryPolicy::new(config.hangup_attempts, config.hangup_pause_ms),
        }
    }

    /// Exact match of the whole quoted number against the configured
    /// one.  An empty configured number authorizes nobody, including a
    /// withheld caller id, and a truncated number never matches.
    pub fn is_authorized(&self, caller: &IncomingCaller) -> bool {
        !self.authorized.is_empty() && !caller.truncated && caller.number == self.authorized
    }

    /// Handle one incoming-call notification.
    pub fn handle(
        &self,
        caller: &IncomingCaller,
        relay: &mut RelayState,
        hw: &mut impl RelayPort,
        modem: &mut impl ModemPort,
    ) -> CallOutcome {
        if !self.is_authorized(caller) {
            info!("Unauthorized call from '{}'", caller.number);
            return CallOutcome::Unauthorized;
        }

        info!("Authorized call!");
        let target = !relay.is_on();
        let outcome = match hw.set_relay(target) {
            Ok(()) => {
                relay.record(target, modem.now_ms());
                CallOutcome::Toggled { on: target }
            }
            Err(e) => {
                warn!("Relay switch failed: {}", e);
                CallOutcome::RelayFailed(e)
            }
        };

        self.hang_up(modem);
        outcome
    }

    /// Send `ATH` under the retry policy.
    pub fn hang_up(&self, modem: &mut impl ModemPort) {
        for (attempt, pause) in self.hangup.pauses().enumerate() {
            if let Err(e) = modem.send_command(at::HANG_UP) {
                warn!("Hang-up attempt {} failed: {}", attempt + 1, e);
            }
            modem.pause_ms(pause);
        }
    }
}
