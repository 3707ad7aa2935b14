//! Fuzz target: `LineFramer::push` plus the response parsers.
//!
//! Drives arbitrary modem output through the framer and hands every
//! completed line to the `+CREG` / `+CLIP` parsers and the unsolicited
//! handler, asserting the framer's bounds hold and nothing panics.
//!
//! cargo fuzz run fuzz_line_framer

#![no_main]

use gsmremote::app::dispatch::{RemoteSwitchHandler, UnsolicitedHandler};
use gsmremote::modem::at::{parse_caller_id, parse_registration};
use gsmremote::modem::framer::{LINE_CAPACITY, LineFramer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut framer = LineFramer::new();
    let mut handler = RemoteSwitchHandler;

    for &byte in data {
        if let Some(line) = framer.push(byte) {
            assert!(!line.bytes.is_empty(), "framer must not yield empty lines");
            assert!(line.bytes.len() <= LINE_CAPACITY, "line exceeds buffer");
            let text = line.to_text();
            assert!(text.is_ascii());
            assert_eq!(text.len(), line.bytes.len());

            let _ = parse_registration(&text);
            let _ = parse_caller_id(&text);
            let _ = handler.on_line(&text);
        }
        assert!(framer.pending() < LINE_CAPACITY);
    }

    // After a reset the framer must accept bytes cleanly again.
    framer.reset();
    assert_eq!(framer.pending(), 0);
});
