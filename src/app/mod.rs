//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the remote switch:
//! scheduling, unsolicited-line dispatch, call handling and the
//! time-constraint sweep.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod dispatch;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
