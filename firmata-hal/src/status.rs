//! Identification reported by the board firmware.

/// Firmata protocol version implemented by the board.
///
/// StandardFirmata sends this unprompted when it starts, and in response to a
/// version request (see [`Board::query_version`]).
///
/// [`Board::query_version`]: crate::Board::query_version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Name and version of the sketch running on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// Firmware major version.
    pub major: u8,
    /// Firmware minor version.
    pub minor: u8,
    /// Firmware name, usually the sketch file name (eg, `StandardFirmata.ino`).
    pub name: String,
}

impl std::fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}.{}", self.name, self.major, self.minor)
    }
}
