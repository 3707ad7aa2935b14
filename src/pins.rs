//! GPIO / peripheral pin assignments for the GSMRemote board.
//!
//! `esp-idf-hal` hands out each GPIO as its own typed field, so `main`
//! picks the field by name and asserts at compile time that it agrees
//! with the numbers here.  The ADC path uses the channel directly.

// ---------------------------------------------------------------------------
// SIM800 modem
// ---------------------------------------------------------------------------

/// UART1 TX towards the modem RXD.
pub const MODEM_TX_GPIO: i32 = 17;
/// UART1 RX from the modem TXD.
pub const MODEM_RX_GPIO: i32 = 18;
/// Modem power key.  Held HIGH; pulsed LOW to toggle modem power.
pub const MODEM_PWRKEY_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Operator console (UART0, USB-serial bridge)
// ---------------------------------------------------------------------------

pub const CONSOLE_TX_GPIO: i32 = 43;
pub const CONSOLE_RX_GPIO: i32 = 44;

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Digital output: HIGH = external device powered, LOW = off.
pub const RELAY_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Supply voltage sense (ADC1)
// ---------------------------------------------------------------------------

/// Battery voltage through the R1/R2 divider: ADC1 channel 4, which is
/// GPIO 5 on the ESP32-S3.
pub const VBAT_ADC1_CHANNEL: u32 = 4;
