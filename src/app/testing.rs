//! In-crate test doubles for the port traits.

use std::collections::VecDeque;
use std::string::{String, ToString};
use std::vec::Vec;

use super::events::AppEvent;
use super::ports::{EventSink, ModemPort, RelayPort, SupplyPort};
use crate::error::{HardwareError, ModemError};
use crate::modem::framer::Line;

/// Scripted modem.  `send_and_await` pops `responses` in order and times
/// out once they run out; `poll_line` pops `unsolicited`.
pub struct FakeModem {
    pub now: u64,
    pub last_activity: u64,
    pub responses: VecDeque<Result<Line, ModemError>>,
    pub unsolicited: VecDeque<Line>,
    /// Every command written, awaited or not.
    pub sent: Vec<String>,
    pub raw: Vec<u8>,
    pub power_toggles: u32,
    pub paused_ms: u64,
}

impl FakeModem {
    pub fn new() -> Self {
        Self {
            now: 0,
            last_activity: 0,
            responses: VecDeque::new(),
            unsolicited: VecDeque::new(),
            sent: Vec::new(),
            raw: Vec::new(),
            power_toggles: 0,
            paused_ms: 0,
        }
    }

    pub fn respond(&mut self, line: &str) {
        self.responses.push_back(Ok(Line::try_from(line).unwrap()));
    }

    pub fn respond_err(&mut self, err: ModemError) {
        self.responses.push_back(Err(err));
    }

    pub fn unsolicited(&mut self, line: &str) {
        self.unsolicited.push_back(Line::try_from(line).unwrap());
    }

    pub fn commands(&self) -> Vec<String> {
        self.sent.clone()
    }
}

impl ModemPort for FakeModem {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn poll_line(&mut self) -> Result<Option<Line>, ModemError> {
        let line = self.unsolicited.pop_front();
        if line.is_some() {
            self.last_activity = self.now;
        }
        Ok(line)
    }

    fn send_command(&mut self, cmd: &str) -> Result<(), ModemError> {
        self.sent.push(cmd.to_string());
        Ok(())
    }

    fn send_and_await(&mut self, cmd: &str, _timeout_ms: u32) -> Result<Line, ModemError> {
        self.sent.push(cmd.to_string());
        let response = self.responses.pop_front().unwrap_or(Err(ModemError::Timeout));
        if response.is_ok() {
            self.last_activity = self.now;
        }
        response
    }

    fn toggle_power(&mut self) -> Result<(), ModemError> {
        self.power_toggles += 1;
        self.last_activity = self.now;
        Ok(())
    }

    fn millis_since_activity(&self) -> u64 {
        self.now.saturating_sub(self.last_activity)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ModemError> {
        self.raw.push(byte);
        Ok(())
    }

    fn pause_ms(&mut self, ms: u32) {
        self.paused_ms += u64::from(ms);
        self.now += u64::from(ms);
    }
}

/// Relay + supply double.
pub struct FakeHw {
    pub relay_writes: Vec<bool>,
    pub supply_mv: Result<u16, HardwareError>,
    pub supply_reads: u32,
    pub fail_relay: bool,
}

impl FakeHw {
    pub fn new() -> Self {
        Self {
            relay_writes: Vec::new(),
            supply_mv: Ok(12_000),
            supply_reads: 0,
            fail_relay: false,
        }
    }
}

impl RelayPort for FakeHw {
    fn set_relay(&mut self, on: bool) -> Result<(), HardwareError> {
        if self.fail_relay {
            return Err(HardwareError::GpioWriteFailed);
        }
        self.relay_writes.push(on);
        Ok(())
    }
}

impl SupplyPort for FakeHw {
    fn supply_millivolts(&mut self) -> Result<u16, HardwareError> {
        self.supply_reads += 1;
        self.supply_mv
    }
}

/// Records every event.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
