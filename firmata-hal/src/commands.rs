use crate::Error;
use crate::constants::{
    DIGITAL_MESSAGE, END_SYSEX, REPORT_DIGITAL, REPORT_FIRMWARE, REPORT_VERSION, SET_PIN_MODE,
    START_SYSEX, SYSTEM_RESET,
};

/// Commands sent from the host to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FirmataCommand {
    /// Set the mode of a single pin.
    SetPinMode { pin: u8, mode: u8 },
    /// Turn value reporting for an 8-pin digital port on or off.
    ReportDigital { port: u8, enable: bool },
    /// Set the output levels of a whole digital port.
    ///
    /// Bit `n` of the mask is pin `port * 8 + n`. Pins in the port not set as
    /// outputs ignore their bit.
    DigitalPortWrite { port: u8, mask: u8 },
    /// Ask the board to send its protocol version.
    ReportVersion,
    /// Ask the board to send its firmware name and version.
    QueryFirmware,
    /// Arbitrary sysex message. Data bytes must already be 7-bit.
    Sysex { command: u8, data: Vec<u8> },
    /// Reset the firmware to its power-up state.
    SystemReset,
}

impl FirmataCommand {
    /// Encode the command into the bytes written to the serial link.
    pub(crate) fn encode(&self) -> Result<Vec<u8>, Error> {
        let bytes = match self {
            FirmataCommand::SetPinMode { pin, mode } => {
                vec![SET_PIN_MODE, check_data_byte(*pin)?, check_data_byte(*mode)?]
            }
            FirmataCommand::ReportDigital { port, enable } => {
                vec![REPORT_DIGITAL | check_channel(*port)?, u8::from(*enable)]
            }
            FirmataCommand::DigitalPortWrite { port, mask } => {
                let [lsb, msb] = split_14_bit(u16::from(*mask));
                vec![DIGITAL_MESSAGE | check_channel(*port)?, lsb, msb]
            }
            FirmataCommand::ReportVersion => vec![REPORT_VERSION],
            FirmataCommand::QueryFirmware => vec![START_SYSEX, REPORT_FIRMWARE, END_SYSEX],
            FirmataCommand::Sysex { command, data } => {
                let mut bytes = Vec::with_capacity(data.len() + 3);
                bytes.push(START_SYSEX);
                bytes.push(check_data_byte(*command)?);
                for byte in data {
                    bytes.push(check_data_byte(*byte)?);
                }
                bytes.push(END_SYSEX);
                bytes
            }
            FirmataCommand::SystemReset => vec![SYSTEM_RESET],
        };
        Ok(bytes)
    }
}

/// Data bytes on the wire never have the high bit set.
fn check_data_byte(byte: u8) -> Result<u8, Error> {
    if byte & 0x80 == 0 {
        Ok(byte)
    } else {
        Err(Error::DataByteOutOfRange(byte))
    }
}

/// Port and channel numbers share the status byte's low nibble.
fn check_channel(channel: u8) -> Result<u8, Error> {
    if channel <= 0x0F {
        Ok(channel)
    } else {
        Err(Error::DataByteOutOfRange(channel))
    }
}

/// Split a 14-bit value into its low and high 7-bit halves.
pub(crate) fn split_14_bit(value: u16) -> [u8; 2] {
    [(value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8]
}

/// Join low and high 7-bit halves into a 14-bit value.
pub(crate) fn join_14_bit(lsb: u8, msb: u8) -> u16 {
    u16::from(lsb & 0x7F) | (u16::from(msb & 0x7F) << 7)
}

/// Decode text sent as pairs of 7-bit bytes (LSB first).
///
/// A trailing unpaired byte is ignored.
pub(crate) fn decode_two_byte_string(data: &[u8]) -> String {
    data.chunks_exact(2)
        .filter_map(|pair| char::from_u32(u32::from(join_14_bit(pair[0], pair[1]))))
        .collect()
}

/// Encode text as pairs of 7-bit bytes (LSB first), for sysex payloads.
///
/// Each UTF-16 unit must fit in 14 bits.
///
/// # Errors
///
/// [`Error::UnencodableChar`] for the first character that does not fit, such
/// as CJK text or anything outside the Basic Multilingual Plane.
pub fn encode_two_byte_string(text: &str) -> Result<Vec<u8>, Error> {
    let mut encoded = Vec::with_capacity(text.len() * 2);
    for c in text.chars() {
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            if *unit >= 0x4000 {
                return Err(Error::UnencodableChar(c));
            }
            encoded.extend(split_14_bit(*unit));
        }
    }
    Ok(encoded)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn set_pin_mode_bytes() {
        let command = FirmataCommand::SetPinMode { pin: 8, mode: 1 };
        assert_eq!(command.encode().unwrap(), [0xF4, 8, 1]);
    }

    #[test]
    fn report_digital_bytes() {
        let on = FirmataCommand::ReportDigital {
            port: 0,
            enable: true,
        };
        let off = FirmataCommand::ReportDigital {
            port: 1,
            enable: false,
        };
        assert_eq!(on.encode().unwrap(), [0xD0, 1]);
        assert_eq!(off.encode().unwrap(), [0xD1, 0]);
    }

    #[test]
    fn digital_port_write_splits_mask() {
        // Pin 7 lands in the high byte.
        let command = FirmataCommand::DigitalPortWrite {
            port: 0,
            mask: 0b1000_0100,
        };
        assert_eq!(command.encode().unwrap(), [0x90, 0b000_0100, 0b1]);

        let command = FirmataCommand::DigitalPortWrite { port: 1, mask: 1 };
        assert_eq!(command.encode().unwrap(), [0x91, 1, 0]);
    }

    #[test]
    fn firmware_query_is_empty_sysex() {
        let bytes = FirmataCommand::QueryFirmware.encode().unwrap();
        assert_eq!(bytes, [0xF0, 0x79, 0xF7]);
    }

    #[test]
    fn sysex_rejects_eight_bit_data() {
        let command = FirmataCommand::Sysex {
            command: 0x71,
            data: vec![0x10, 0x80],
        };
        assert!(matches!(
            command.encode(),
            Err(Error::DataByteOutOfRange(0x80))
        ));
    }

    #[test]
    fn port_number_must_fit_in_nibble() {
        let command = FirmataCommand::ReportDigital {
            port: 16,
            enable: true,
        };
        assert!(command.encode().is_err());
    }

    #[test]
    fn two_byte_strings() {
        let encoded = encode_two_byte_string("Hi").unwrap();
        assert_eq!(encoded, [b'H', 0, b'i', 0]);
        assert_eq!(decode_two_byte_string(&encoded), "Hi");
        // Unpaired trailing byte.
        assert_eq!(decode_two_byte_string(&[b'A', 0, b'B']), "A");
    }

    #[test]
    fn two_byte_strings_reject_wide_characters() {
        assert_eq!(encode_two_byte_string("é").unwrap(), [0x69, 0x01]);
        assert!(matches!(
            encode_two_byte_string("ok 漢"),
            Err(Error::UnencodableChar('漢'))
        ));
        assert!(matches!(
            encode_two_byte_string("🙂"),
            Err(Error::UnencodableChar('🙂'))
        ));
    }
}
