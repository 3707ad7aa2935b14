//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements           | Connects to              |
//! |-------------|----------------------|--------------------------|
//! | `hardware`  | RelayPort            | relay GPIO               |
//! |             | SupplyPort           | ESP32 ADC1 (VBAT)        |
//! | `log_sink`  | EventSink            | Serial log output        |
//! | `time`      | Clock                | ESP32 system timer       |
//! | `uart`      | Transport            | ESP-IDF UART driver      |

pub mod hardware;
pub mod log_sink;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
