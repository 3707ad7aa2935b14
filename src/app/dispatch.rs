//! Unsolicited response handling.
//!
//! Lines that arrive while no command is in flight go to a single
//! [`UnsolicitedHandler`].  The handler only classifies; it returns a
//! [`ReactionSet`] and the service carries the reactions out, so a
//! deployment can swap policies without touching the framer or the
//! service.

use heapless::Vec;

use crate::modem::at::{self, IncomingCaller};
use crate::scheduler::TaskId;

/// Most reactions a single line can produce.
pub const MAX_REACTIONS: usize = 4;

/// What the service should do in response to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    EnableTask(TaskId),
    DisableTask(TaskId),
    PowerCycleModem,
    IncomingCall(IncomingCaller),
    /// Not recognised; the service surfaces it.
    Unhandled,
}

pub type ReactionSet = Vec<Reaction, MAX_REACTIONS>;

/// Classifies unsolicited modem lines.
pub trait UnsolicitedHandler {
    fn on_line(&mut self, line: &str) -> ReactionSet;
}

/// Handler for the remote power switch.
///
/// | Line                                   | Reaction                         |
/// |----------------------------------------|----------------------------------|
/// | `RDY` `+CFUN: 1` `+CPIN: READY` `RING` | none                             |
/// | `SMS Ready` `Call Ready`               | enable network polling           |
/// | `+CLIP: "<number>"...`                 | incoming call                    |
/// | `NORMAL POWER DOWN`                    | power cycle, disable polling     |
/// | anything else                          | unhandled                        |
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteSwitchHandler;

const IGNORED: [&str; 4] = ["RDY", "+CFUN: 1", "+CPIN: READY", "RING"];
const READY: [&str; 2] = ["SMS Ready", "Call Ready"];
const POWER_DOWN: &str = "NORMAL POWER DOWN";

impl UnsolicitedHandler for RemoteSwitchHandler {
    fn on_line(&mut self, line: &str) -> ReactionSet {
        let mut reactions = ReactionSet::new();
        // Pushes below never exceed MAX_REACTIONS.
        if IGNORED.contains(&line) {
            // Boot chatter and the ring preceding +CLIP.
        } else if READY.contains(&line) {
            let _ = reactions.push(Reaction::EnableTask(TaskId::NetworkStatus));
        } else if let Some(caller) = at::parse_caller_id(line) {
            let _ = reactions.push(Reaction::IncomingCall(caller));
        } else if line == POWER_DOWN {
            // Seen when the MCU restarts while the modem is already on:
            // the boot toggle switched it off, so switch it back on.
            let _ = reactions.push(Reaction::PowerCycleModem);
            let _ = reactions.push(Reaction::DisableTask(TaskId::NetworkStatus));
        } else {
            let _ = reactions.push(Reaction::Unhandled);
        }
        reactions
    }
}
