//! System configuration parameters
//!
//! All tunable parameters for the GSMRemote switch.  Values are fixed at
//! build time: the defaults below, the authorized caller from the
//! `GSM_REMOTE_AUTHORIZED_NUMBER` environment variable, and optionally a
//! JSON override embedded by the binary.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Longest caller id the firmware stores or compares.
pub const MAX_CALLER_ID_LEN: usize = 31;

/// Shortest power-key pulse that reliably toggles the SIM800.
pub const MIN_POWER_KEY_PULSE_MS: u32 = 1100;

const fn minutes(m: u64) -> u64 {
    m * 60 * 1000
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Caller authorization ---
    /// The single caller id allowed to toggle the relay.  Empty = nobody.
    pub authorized_number: String<MAX_CALLER_ID_LEN>,

    // --- Modem link ---
    /// Modem UART baud rate.
    pub modem_baud: u32,
    /// Default response timeout for correlated commands (ms).
    pub command_timeout_ms: u32,
    /// Interval between framer polls while awaiting a response (ms).
    pub poll_interval_ms: u32,
    /// Settle window before draining stale bytes (ms).  0 disables flushing.
    pub flush_settle_ms: u32,
    /// Power-key low pulse width (ms).
    pub power_key_pulse_ms: u32,

    // --- Call handling ---
    /// Number of `ATH` attempts after an authorized call.
    pub hangup_attempts: u8,
    /// Pause after each `ATH` attempt (ms).
    pub hangup_pause_ms: u32,

    // --- Task periods ---
    /// Network registration poll period (ms).
    pub network_check_interval_ms: u64,
    /// Time-constraint sweep period (ms).
    pub watchdog_interval_ms: u64,
    /// Main loop idle delay (ms).
    pub loop_interval_ms: u32,

    // --- Watchdog thresholds ---
    /// Power cycle the modem after this long without registration (ms).
    pub bad_network_hold_ms: u64,
    /// Power cycle the modem after this long without a byte from it (ms).
    pub no_activity_hold_ms: u64,
    /// Force the relay off after it has been on this long (ms).
    pub max_on_duration_ms: u64,
    /// Force the relay off at or above this supply voltage (mV).
    pub cutoff_voltage_mv: u16,

    // --- Supply voltage sense ---
    /// Upper divider resistor (ohms).
    pub vbat_r1_ohms: u32,
    /// Lower divider resistor (ohms).
    pub vbat_r2_ohms: u32,
    /// ADC full-scale reference (mV).
    pub adc_ref_mv: u32,
    /// ADC full-scale raw count.
    pub adc_max: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut authorized_number = String::new();
        if let Some(number) = option_env!("GSM_REMOTE_AUTHORIZED_NUMBER") {
            // An oversize number leaves nobody authorized rather than a
            // truncated prefix.
            let _ = authorized_number.push_str(number);
        }

        Self {
            authorized_number,

            // Modem link
            modem_baud: 9600,
            command_timeout_ms: 1000,
            poll_interval_ms: 50,
            flush_settle_ms: 250,
            power_key_pulse_ms: MIN_POWER_KEY_PULSE_MS,

            // Call handling
            hangup_attempts: 3,
            hangup_pause_ms: 1000,

            // Task periods
            network_check_interval_ms: minutes(5),
            watchdog_interval_ms: minutes(1),
            loop_interval_ms: 100,

            // Watchdog thresholds
            bad_network_hold_ms: minutes(20),
            no_activity_hold_ms: minutes(10),
            max_on_duration_ms: minutes(15),
            cutoff_voltage_mv: 13_000,

            // 54.9k / 4.3k divider into a 12-bit ADC at 12 dB attenuation
            vbat_r1_ohms: 54_900,
            vbat_r2_ohms: 4_300,
            adc_ref_mv: 3_100,
            adc_max: 4095,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would defeat the watchdog or wedge the modem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.power_key_pulse_ms < MIN_POWER_KEY_PULSE_MS {
            return Err(ConfigError::ValidationFailed(
                "power_key_pulse_ms below modem minimum",
            ));
        }
        if self.poll_interval_ms == 0 || self.command_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "poll interval and command timeout must be non-zero",
            ));
        }
        if self.poll_interval_ms > self.command_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms exceeds command_timeout_ms",
            ));
        }
        if self.network_check_interval_ms == 0 || self.watchdog_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("task intervals must be non-zero"));
        }
        if self.hangup_attempts == 0 {
            return Err(ConfigError::ValidationFailed("hangup_attempts must be at least 1"));
        }
        if self.vbat_r2_ohms == 0 || self.adc_max == 0 {
            return Err(ConfigError::ValidationFailed("voltage divider is degenerate"));
        }
        if self.bad_network_hold_ms < self.network_check_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "bad_network_hold_ms shorter than the network check period",
            ));
        }
        Ok(())
    }
}
