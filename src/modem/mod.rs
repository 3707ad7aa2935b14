//! SIM800 line-protocol engine.
//!
//! [`Modem`] owns the serial transport, the power key, the response
//! framer and the activity clock.  It implements [`ModemPort`], the only
//! view of the modem the application core sees.
//!
//! ```text
//!  Transport ──bytes──▶ LineFramer ──lines──▶ send_and_await (command in flight)
//!      │                                  └─▶ poll_line      (unsolicited)
//!      └─ every byte stamps the ActivityClock
//! ```
//!
//! All waits are bounded and go through [`DelayNs`]: correlator polls,
//! flush settle windows and the power-key pulse.

pub mod at;
pub mod framer;
pub mod transport;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::app::ports::{Clock, ModemPort, elapsed_ms};
use crate::config::SystemConfig;
use crate::drivers::power_key::PowerKey;
use crate::error::ModemError;

use framer::{Line, LineFramer};
use transport::Transport;

// ───────────────────────────────────────────────────────────────
// Timing
// ───────────────────────────────────────────────────────────────

/// Link timing taken from [`SystemConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ModemTiming {
    /// Interval between framer polls while a command is in flight.
    pub poll_interval_ms: u32,
    /// Settle window before draining stale bytes.  0 disables flushing.
    pub flush_settle_ms: u32,
    /// Power-key low pulse width.
    pub power_key_pulse_ms: u32,
}

impl ModemTiming {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            poll_interval_ms: config.poll_interval_ms,
            flush_settle_ms: config.flush_settle_ms,
            power_key_pulse_ms: config.power_key_pulse_ms,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Activity clock
// ───────────────────────────────────────────────────────────────

/// Timestamp of the last byte received from the modem.
#[derive(Debug, Clone, Copy)]
pub struct ActivityClock {
    last_ms: u64,
}

impl ActivityClock {
    pub fn new(now_ms: u64) -> Self {
        Self { last_ms: now_ms }
    }

    pub fn stamp(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    /// Elapsed since the last byte; a stamp in the future counts as now.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        elapsed_ms(now_ms, self.last_ms)
    }
}

// ───────────────────────────────────────────────────────────────
// Command session
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Satisfied,
    TimedOut,
}

/// One correlated exchange.  The deadline is a poll budget so the wait
/// stays bounded even if the clock stalls.
#[derive(Debug)]
pub struct CommandSession {
    polls_left: u32,
    state: SessionState,
}

impl CommandSession {
    pub fn new(timeout_ms: u32, poll_interval_ms: u32) -> Self {
        let polls = timeout_ms.div_ceil(poll_interval_ms.max(1)).max(1);
        Self {
            polls_left: polls,
            state: SessionState::Pending,
        }
    }

    /// Consume one poll.  Returns `false` once the budget is spent.
    pub fn next_poll(&mut self) -> bool {
        if self.state != SessionState::Pending {
            return false;
        }
        if self.polls_left == 0 {
            self.state = SessionState::TimedOut;
            return false;
        }
        self.polls_left -= 1;
        true
    }

    pub fn satisfy(&mut self) {
        self.state = SessionState::Satisfied;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

// ───────────────────────────────────────────────────────────────
// Modem
// ───────────────────────────────────────────────────────────────

/// The modem engine.
pub struct Modem<T, P, D, C> {
    serial: T,
    power_key: PowerKey<P>,
    delay: D,
    clock: C,
    framer: LineFramer,
    activity: ActivityClock,
    timing: ModemTiming,
}

impl<T, P, D, C> Modem<T, P, D, C>
where
    T: Transport,
    P: OutputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(serial: T, power_key: PowerKey<P>, delay: D, clock: C, timing: ModemTiming) -> Self {
        let activity = ActivityClock::new(clock.now_ms());
        Self {
            serial,
            power_key,
            delay,
            clock,
            framer: LineFramer::new(),
            activity,
            timing,
        }
    }

    /// Power-key pulses since boot.
    pub fn power_key_pulses(&self) -> u32 {
        self.power_key.pulse_count()
    }

    // ── Internal ──────────────────────────────────────────────

    fn read_byte(&mut self) -> Result<Option<u8>, ModemError> {
        if !self.serial.available() {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        let n = self.serial.read(&mut byte).map_err(|e| {
            warn!("Modem: serial read failed: {:?}", e);
            ModemError::Serial
        })?;
        if n == 0 {
            return Ok(None);
        }
        self.activity.stamp(self.clock.now_ms());
        Ok(Some(byte[0]))
    }

    fn write_all(&mut self, mut data: &[u8]) -> Result<(), ModemError> {
        while !data.is_empty() {
            let n = self.serial.write(data).map_err(|e| {
                warn!("Modem: serial write failed: {:?}", e);
                ModemError::Serial
            })?;
            if n == 0 {
                return Err(ModemError::Serial);
            }
            data = &data[n..];
        }
        self.serial.flush().map_err(|_| ModemError::Serial)
    }

    fn write_line(&mut self, cmd: &str) -> Result<(), ModemError> {
        debug!("Modem TX: {}", cmd);
        self.write_all(cmd.as_bytes())?;
        self.write_all(at::COMMAND_TERMINATOR)
    }

    /// Wait the settle window, then drain and discard pending bytes.
    fn flush(&mut self) -> Result<(), ModemError> {
        if self.timing.flush_settle_ms == 0 {
            return Ok(());
        }
        self.delay.delay_ms(self.timing.flush_settle_ms);
        let mut discarded = 0usize;
        while self.read_byte()?.is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("Modem: flushed {} stale bytes", discarded);
        }
        Ok(())
    }
}

impl<T, P, D, C> ModemPort for Modem<T, P, D, C>
where
    T: Transport,
    P: OutputPin,
    D: DelayNs,
    C: Clock,
{
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn poll_line(&mut self) -> Result<Option<Line>, ModemError> {
        while let Some(byte) = self.read_byte()? {
            if let Some(framed) = self.framer.push(byte) {
                if framed.truncated {
                    warn!(
                        "Modem: {}, delivering {} bytes",
                        ModemError::BufferOverflow,
                        framed.bytes.len()
                    );
                }
                let line = framed.to_text();
                debug!("Modem RX: {}", line);
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn send_command(&mut self, cmd: &str) -> Result<(), ModemError> {
        self.write_line(cmd)?;
        self.flush()
    }

    fn send_and_await(&mut self, cmd: &str, timeout_ms: u32) -> Result<Line, ModemError> {
        self.flush()?;
        self.framer.reset();
        self.write_line(cmd)?;

        let mut session = CommandSession::new(timeout_ms, self.timing.poll_interval_ms);
        let mut response = None;
        while session.next_poll() {
            self.delay.delay_ms(self.timing.poll_interval_ms);
            if let Some(line) = self.poll_line()? {
                session.satisfy();
                response = Some(line);
            }
        }

        self.flush()?;
        self.framer.reset();

        match response {
            Some(line) => Ok(line),
            None => {
                debug!("Modem: '{}' timed out after {}ms", cmd, timeout_ms);
                Err(ModemError::Timeout)
            }
        }
    }

    fn toggle_power(&mut self) -> Result<(), ModemError> {
        info!("Toggling power state of the modem");
        self.framer.reset();
        let pulse = self
            .power_key
            .pulse(&mut self.delay, self.timing.power_key_pulse_ms);
        // The modem is silent through warm-up whatever the pin did.
        self.activity.stamp(self.clock.now_ms());
        pulse.map_err(|e| {
            warn!("Modem: power key pulse failed: {}", e);
            ModemError::PowerKey
        })
    }

    fn millis_since_activity(&self) -> u64 {
        self.activity.elapsed_ms(self.clock.now_ms())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ModemError> {
        self.write_all(&[byte])
    }

    fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
