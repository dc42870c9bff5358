//! Firmata protocol bytes.

/// Digital port value, low nibble is the port number.
pub(crate) const DIGITAL_MESSAGE: u8 = 0x90;
/// Analog pin value, low nibble is the analog channel.
pub(crate) const ANALOG_MESSAGE: u8 = 0xE0;
/// Enable or disable digital port reporting, low nibble is the port number.
pub(crate) const REPORT_DIGITAL: u8 = 0xD0;
pub(crate) const START_SYSEX: u8 = 0xF0;
pub(crate) const SET_PIN_MODE: u8 = 0xF4;
pub(crate) const END_SYSEX: u8 = 0xF7;
/// Protocol version request and response.
pub(crate) const REPORT_VERSION: u8 = 0xF9;
pub(crate) const SYSTEM_RESET: u8 = 0xFF;

/// Sysex: string message from the board.
pub(crate) const STRING_DATA: u8 = 0x71;
/// Sysex: firmware name and version request and response.
pub(crate) const REPORT_FIRMWARE: u8 = 0x79;

/// Serial speed used by StandardFirmata.
pub(crate) const DEFAULT_BAUD_RATE: u32 = 57_600;
