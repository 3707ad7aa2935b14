//! Network registration monitor.
//!
//! Each run wakes the modem, asks for its registration state and stamps
//! [`NetworkHealth`] when the modem reports the home network.  The modem
//! is always sent back to slow-clock mode afterwards; a refusal is
//! logged and otherwise ignored.

use log::{info, warn};

use crate::app::ports::ModemPort;
use crate::app::state::NetworkHealth;
use crate::modem::at;

/// Outcome of one registration poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkReport {
    /// Parsed `+CREG` status, `None` on timeout or a malformed line.
    pub registration: Option<u8>,
    /// The modem accepted slow-clock mode.
    pub sleeping: bool,
}

impl NetworkReport {
    pub fn is_registered(&self) -> bool {
        self.registration == Some(at::REGISTERED_HOME)
    }
}

/// Poll registration once.  `health` is stamped only on status 1.
pub fn check_network_status(
    modem: &mut impl ModemPort,
    health: &mut NetworkHealth,
    timeout_ms: u32,
) -> NetworkReport {
    // Wake up; the response is discarded.
    if let Err(e) = modem.send_command(at::PROBE) {
        warn!("Network: wake probe failed: {}", e);
    }

    let registration = match modem.send_and_await(at::QUERY_REGISTRATION, timeout_ms) {
        Ok(line) => {
            let status = at::parse_registration(&line);
            if status.is_none() {
                warn!("Network: malformed registration response '{}'", line);
            }
            status
        }
        Err(e) => {
            warn!("Network: registration query failed: {}", e);
            None
        }
    };

    if registration == Some(at::REGISTERED_HOME) {
        health.mark_good(modem.now_ms());
        info!("Network: registered");
    } else {
        info!("Network: not registered (status {:?})", registration);
    }

    let sleeping = match modem.send_and_verify(at::ENTER_SLOW_CLOCK, at::OK, timeout_ms) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to enter sleep mode: {}", e);
            false
        }
    };

    NetworkReport {
        registration,
        sleeping,
    }
}
