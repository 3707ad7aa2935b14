//! GSM remote switch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod call;
pub mod config;
pub mod console;
pub mod error;
pub mod modem;
pub mod network;
pub mod pins;
pub mod safety;
pub mod scheduler;

// Host builds get the simulation halves of these; the ESP-IDF halves are
// guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
