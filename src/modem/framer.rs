//! Streaming line framer for modem output.
//!
//! The SIM800 terminates every response and notification with `\r` and
//! pads it with `\n`.  The framer accumulates bytes into a fixed buffer
//! and yields a [`FramedLine`] on each `\r` that follows non-empty
//! content:
//!
//! ```text
//!  \r\n RDY \r\n \r\n +CFUN: 1 \r\n
//!       ───┬──          ────┬───
//!          ▼                ▼
//!        "RDY"         "+CFUN: 1"
//! ```
//!
//! A line that fills the buffer is delivered early with `truncated` set,
//! which bounds memory and guarantees progress against flooding input.
//!
//! Bytes are kept exactly as received.  [`FramedLine::to_text`] is where
//! they become a [`Line`]; anything outside printable ASCII reads as `?`
//! there, so the parsers only ever see plain text.

use heapless::{String, Vec};

/// Response buffer capacity in bytes.
pub const LINE_CAPACITY: usize = 48;

/// Raw bytes of one line, terminators stripped.
pub type RawLine = Vec<u8, LINE_CAPACITY>;

/// A complete line of modem output, as text.
pub type Line = String<LINE_CAPACITY>;

/// A line produced by the framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedLine {
    pub bytes: RawLine,
    /// The line hit [`LINE_CAPACITY`] before its terminator arrived.
    pub truncated: bool,
}

impl FramedLine {
    /// The line as text.  Same length as `bytes`.
    pub fn to_text(&self) -> Line {
        let mut text = Line::new();
        for &b in &self.bytes {
            let ch = if b.is_ascii() && !b.is_ascii_control() { b as char } else { '?' };
            // One char per byte, same capacity.
            let _ = text.push(ch);
        }
        text
    }
}

/// Accumulates modem bytes into lines.
pub struct LineFramer {
    buf: RawLine,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed one byte.  Returns a line when one completes.
    pub fn push(&mut self, byte: u8) -> Option<FramedLine> {
        match byte {
            b'\n' => None,
            b'\r' => {
                if self.buf.is_empty() {
                    None
                } else {
                    Some(self.take(false))
                }
            }
            other => {
                // Cannot fail: the buffer is drained as soon as it fills.
                let _ = self.buf.push(other);
                if self.buf.is_full() {
                    Some(self.take(true))
                } else {
                    None
                }
            }
        }
    }

    /// Bytes accumulated towards the current line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Discard any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    fn take(&mut self, truncated: bool) -> FramedLine {
        let bytes = core::mem::take(&mut self.buf);
        FramedLine { bytes, truncated }
    }
}
