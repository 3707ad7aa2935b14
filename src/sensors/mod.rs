//! Sensor drivers.

pub mod battery;
