//! Time-constraint sweep.
//!
//! Runs on its own schedule (once a minute by default) and evaluates
//! every condition on every sweep, independently:
//!
//! | Fault              | Condition                                  | Action             |
//! |--------------------|--------------------------------------------|--------------------|
//! | `NetworkUnhealthy` | no registration for `bad_network_hold_ms`  | power cycle modem  |
//! | `ModemSilence`     | no modem byte for `no_activity_hold_ms`    | power cycle modem  |
//! | `MaxOnDuration`    | relay on longer than `max_on_duration_ms`  | relay off          |
//! | `OverVoltage`      | relay on and supply ≥ `cutoff_voltage_mv`  | relay off          |
//!
//! The sweep itself is pure: it maps a [`SweepInputs`] snapshot to a
//! [`FaultSet`].  The service performs the actions so the sweep never
//! writes shared state.

use log::error;

use crate::config::SystemConfig;
use crate::error::{FaultSet, SafetyFault};

/// Snapshot the sweep reads.  All durations are already wrap-safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepInputs {
    /// Time since the last good registration.
    pub since_network_ok_ms: u64,
    /// Time since the last byte from the modem.
    pub since_modem_activity_ms: u64,
    /// Time the relay has been on, `None` while off.
    pub relay_on_for_ms: Option<u64>,
    /// Supply voltage, `None` if not measured.
    pub supply_mv: Option<u16>,
}

/// Threshold set for the sweep.
#[derive(Debug, Clone, Copy)]
pub struct TimeConstraints {
    bad_network_hold_ms: u64,
    no_activity_hold_ms: u64,
    max_on_duration_ms: u64,
    cutoff_voltage_mv: u16,
}

impl TimeConstraints {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            bad_network_hold_ms: config.bad_network_hold_ms,
            no_activity_hold_ms: config.no_activity_hold_ms,
            max_on_duration_ms: config.max_on_duration_ms,
            cutoff_voltage_mv: config.cutoff_voltage_mv,
        }
    }

    /// Evaluate all four conditions.
    pub fn evaluate(&self, inputs: &SweepInputs) -> FaultSet {
        let mut faults = FaultSet::empty();

        // ── Network / modem liveness ──────────────────────────
        if inputs.since_network_ok_ms > self.bad_network_hold_ms {
            faults.insert(SafetyFault::NetworkUnhealthy);
        }
        if inputs.since_modem_activity_ms > self.no_activity_hold_ms {
            faults.insert(SafetyFault::ModemSilence);
        }

        // ── Relay limits ──────────────────────────────────────
        if let Some(on_for) = inputs.relay_on_for_ms {
            if on_for > self.max_on_duration_ms {
                faults.insert(SafetyFault::MaxOnDuration);
            }
            if inputs.supply_mv.is_some_and(|mv| mv >= self.cutoff_voltage_mv) {
                faults.insert(SafetyFault::OverVoltage);
            }
        }

        for fault in faults.iter() {
            error!("SAFETY FAULT: {fault}");
        }
        faults
    }
}

impl FaultSet {
    /// Either liveness fault calls for a modem power cycle.
    pub fn requires_modem_restart(&self) -> bool {
        self.contains(SafetyFault::NetworkUnhealthy) || self.contains(SafetyFault::ModemSilence)
    }

    /// Either relay fault calls for forcing the relay off.
    pub fn requires_relay_off(&self) -> bool {
        self.contains(SafetyFault::MaxOnDuration) || self.contains(SafetyFault::OverVoltage)
    }
}
