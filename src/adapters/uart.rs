//! ESP-IDF UART transport.
//!
//! Implements [`Transport`] over an `esp-idf-hal` [`UartDriver`].  Reads
//! never block: the modem engine polls, and `available()` reports the
//! driver's RX ring occupancy.  Also used for the operator console on
//! UART0.

use esp_idf_svc::hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::modem::transport::Transport;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }

    /// One byte if one is waiting.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte, NON_BLOCK) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

impl Transport for UartTransport<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.uart.wait_tx_done(BLOCK)
    }

    fn available(&self) -> bool {
        self.uart.remaining_read().is_ok_and(|n| n > 0)
    }
}
