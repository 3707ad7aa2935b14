//! SIM800 command strings and response parsers.

use heapless::String;

use crate::config::MAX_CALLER_ID_LEN;

/// Liveness probe; also wakes the modem from slow-clock mode.
pub const PROBE: &str = "AT";
/// Query network registration.
pub const QUERY_REGISTRATION: &str = "AT+CREG?";
/// Enter slow-clock (low-power serial) mode 2.
pub const ENTER_SLOW_CLOCK: &str = "AT+CSCLK=2";
/// Hang up the active call.
pub const HANG_UP: &str = "ATH";
/// Final result code for success.
pub const OK: &str = "OK";

/// Line terminator for outgoing commands.  Order matters.
pub const COMMAND_TERMINATOR: &[u8] = b"\n\r";

/// Ctrl-Z, the text-mode submit/abort character.
pub const CTRL_Z: u8 = 0x1A;

/// `+CREG` status code for "registered, home network".
pub const REGISTERED_HOME: u8 = 1;

const CREG_PREFIX: &str = "+CREG: 0,";
const CLIP_PREFIX: &str = "+CLIP: \"";

/// Caller id extracted from a `+CLIP` notification.
pub type CallerId = String<MAX_CALLER_ID_LEN>;

/// Parse the status code out of a `+CREG: 0,<n>` response.
///
/// Only the leading digits after the prefix count, so trailing fields
/// such as `+CREG: 0,1,"00C1"` still parse.
pub fn parse_registration(line: &str) -> Option<u8> {
    let rest = line.strip_prefix(CREG_PREFIX)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    rest[..digits].parse().ok()
}

/// Number carried by a `+CLIP` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCaller {
    pub number: CallerId,
    /// The quoted field was longer than [`MAX_CALLER_ID_LEN`]; `number`
    /// holds only its prefix and must not be matched against anything.
    pub truncated: bool,
}

/// Extract the quoted number from `+CLIP: "<number>",...`.
///
/// The scan stops at the closing quote or after [`MAX_CALLER_ID_LEN`]
/// characters, whichever comes first.
pub fn parse_caller_id(line: &str) -> Option<IncomingCaller> {
    let rest = line.strip_prefix(CLIP_PREFIX)?;
    let mut number = CallerId::new();
    let mut truncated = false;
    for ch in rest.chars().take_while(|c| *c != '"') {
        if number.push(ch).is_err() {
            truncated = true;
            break;
        }
    }
    Some(IncomingCaller { number, truncated })
}
