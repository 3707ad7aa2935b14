//! Mock hardware for integration tests.
//!
//! A simulated clock shared by every mock: the delay advances it, the
//! serial port uses it to decide which modem bytes have "arrived", and
//! the modem engine reads it for activity stamps.  The serial port plays
//! the SIM800: it records each command line and answers from a script.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use gsmremote::app::events::AppEvent;
use gsmremote::app::ports::{Clock, EventSink, RelayPort, SupplyPort};
use gsmremote::config::SystemConfig;
use gsmremote::drivers::power_key::PowerKey;
use gsmremote::drivers::relay::RelayDriver;
use gsmremote::error::HardwareError;
use gsmremote::modem::transport::Transport;
use gsmremote::modem::{Modem, ModemTiming};

// ── Clock + delay ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl SimClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Every wait moves simulated time forward instead of sleeping.
pub struct MockDelay {
    clock: SimClock,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns.div_ceil(1_000_000)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}

// ── Serial ────────────────────────────────────────────────────

#[derive(Default)]
struct SerialInner {
    /// Bytes from the modem, each with its arrival time.
    rx: VecDeque<(u64, u8)>,
    tx: Vec<u8>,
    pending_cmd: Vec<u8>,
    commands: Vec<String>,
    /// Command → (reply line, latency).
    script: HashMap<String, (String, u64)>,
}

/// Scripted SIM800.  Clones share state, so a test keeps one handle
/// while the modem engine owns another.
#[derive(Clone)]
pub struct MockSerial {
    inner: Rc<RefCell<SerialInner>>,
    clock: SimClock,
}

#[allow(dead_code)]
impl MockSerial {
    pub fn new(clock: SimClock) -> Self {
        Self {
            inner: Rc::default(),
            clock,
        }
    }

    /// Answer `cmd` with `reply` after `latency_ms`.
    pub fn script(&self, cmd: &str, reply: &str, latency_ms: u64) {
        self.inner
            .borrow_mut()
            .script
            .insert(cmd.to_string(), (reply.to_string(), latency_ms));
    }

    pub fn unscript(&self, cmd: &str) {
        self.inner.borrow_mut().script.remove(cmd);
    }

    /// Modem output available now, framed the way the SIM800 frames it.
    pub fn emit_line(&self, line: &str) {
        let at = self.clock.now_ms();
        self.emit_raw_at(at, format!("\r\n{line}\r\n").as_bytes());
    }

    pub fn emit_raw_at(&self, at_ms: u64, bytes: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        inner.rx.extend(bytes.iter().map(|b| (at_ms, *b)));
    }

    /// Command lines written so far, terminators stripped.
    pub fn commands(&self) -> Vec<String> {
        self.inner.borrow().commands.clone()
    }

    pub fn count(&self, cmd: &str) -> usize {
        self.inner.borrow().commands.iter().filter(|c| *c == cmd).count()
    }

    pub fn tx_bytes(&self) -> Vec<u8> {
        self.inner.borrow().tx.clone()
    }

    pub fn pending_rx(&self) -> usize {
        self.inner.borrow().rx.len()
    }
}

impl Transport for MockSerial {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.borrow_mut();
        let mut n = 0;
        while n < buf.len() {
            match inner.rx.front() {
                Some(&(at, byte)) if at <= now => {
                    buf[n] = byte;
                    inner.rx.pop_front();
                    n += 1;
                }
                _ => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Infallible> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.borrow_mut();
        inner.tx.extend_from_slice(data);
        inner.pending_cmd.extend_from_slice(data);
        if inner.pending_cmd.ends_with(b"\n\r") {
            let len = inner.pending_cmd.len() - 2;
            let cmd = String::from_utf8_lossy(&inner.pending_cmd[..len]).into_owned();
            inner.pending_cmd.clear();
            if let Some((reply, latency)) = inner.script.get(&cmd).cloned() {
                let bytes = format!("\r\n{reply}\r\n");
                inner.rx.extend(bytes.bytes().map(|b| (now + latency, b)));
            }
            inner.commands.push(cmd);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn available(&self) -> bool {
        let now = self.clock.now_ms();
        self.inner
            .borrow()
            .rx
            .front()
            .is_some_and(|&(at, _)| at <= now)
    }
}

// ── Pins ──────────────────────────────────────────────────────

/// Output pin recording every level written.
#[derive(Clone, Default)]
pub struct MockPin {
    levels: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }

    pub fn is_high(&self) -> bool {
        self.levels.borrow().last().copied().unwrap_or(false)
    }

    /// Number of HIGH → LOW edges.
    pub fn falling_edges(&self) -> usize {
        self.levels
            .borrow()
            .windows(2)
            .filter(|w| w[0] && !w[1])
            .count()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

// ── Relay + supply ────────────────────────────────────────────

/// Relay driver on a mock pin plus a settable supply voltage.
pub struct MockBoard {
    relay: RelayDriver<MockPin>,
    pub supply_mv: u16,
}

impl RelayPort for MockBoard {
    fn set_relay(&mut self, on: bool) -> Result<(), HardwareError> {
        self.relay.set(on)
    }
}

impl SupplyPort for MockBoard {
    fn supply_millivolts(&mut self) -> Result<u16, HardwareError> {
        Ok(self.supply_mv)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type SimModem = Modem<MockSerial, MockPin, MockDelay, SimClock>;

/// Everything wired together, with handles kept for assertions.
pub struct Rig {
    pub clock: SimClock,
    pub serial: MockSerial,
    pub power_pin: MockPin,
    pub relay_pin: MockPin,
    pub modem: SimModem,
    pub board: MockBoard,
    pub sink: RecordingSink,
}

impl Rig {
    pub fn new(config: &SystemConfig) -> Self {
        let clock = SimClock::default();
        let serial = MockSerial::new(clock.clone());
        let power_pin = MockPin::default();
        let relay_pin = MockPin::default();

        let power_key = PowerKey::new(power_pin.clone()).unwrap();
        let modem = Modem::new(
            serial.clone(),
            power_key,
            MockDelay {
                clock: clock.clone(),
            },
            clock.clone(),
            ModemTiming::from_config(config),
        );
        let board = MockBoard {
            relay: RelayDriver::new(relay_pin.clone()).unwrap(),
            supply_mv: 12_000,
        };

        Self {
            clock,
            serial,
            power_pin,
            relay_pin,
            modem,
            board,
            sink: RecordingSink::default(),
        }
    }
}
