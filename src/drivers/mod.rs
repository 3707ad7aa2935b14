//! Output drivers and hardware initialisation.

pub mod hw_init;
pub mod power_key;
pub mod relay;
