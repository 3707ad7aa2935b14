//! Debug console commands.
//!
//! The operator console is a raw byte stream.  A handful of characters
//! are commands; every other byte goes straight to the modem so AT
//! commands can be typed by hand.

/// Ctrl-Z, terminates SMS text entry on the modem.
pub const CTRL_Z: u8 = crate::modem::at::CTRL_Z;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `<`: pulse the power key and stop network polling.
    ToggleModemPower,
    /// `>`: send Ctrl-Z.
    SendCtrlZ,
    /// `~`: run the registration poll now.
    CheckNetwork,
    /// `!`: log the supply voltage.
    PrintSupplyVoltage,
    /// Anything else, passed through unchanged.
    Forward(u8),
}

impl ConsoleCommand {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'<' => Self::ToggleModemPower,
            b'>' => Self::SendCtrlZ,
            b'~' => Self::CheckNetwork,
            b'!' => Self::PrintSupplyVoltage,
            other => Self::Forward(other),
        }
    }
}
