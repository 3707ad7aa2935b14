//! Serial link to the SIM800.
//!
//! On the board this is UART1 (`adapters::uart`); the integration tests
//! plug in a scripted serial port with simulated latency.  The modem
//! engine reads one byte at a time and never waits inside a read: all
//! waiting happens in its own poll loop through `DelayNs`.

/// Byte channel to the modem.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Copy whatever is already buffered into `buf`.  `Ok(0)` when the
    /// RX buffer is empty; must not block.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue `data` for transmission.  May accept fewer bytes than given;
    /// `Ok(0)` means the link is stuck.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Block until queued bytes are on the wire, so a following settle
    /// window starts after the command has actually been sent.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// At least one received byte is waiting.
    fn available(&self) -> bool;
}
