use crate::commands::{decode_two_byte_string, join_14_bit};
use crate::constants::{
    ANALOG_MESSAGE, DIGITAL_MESSAGE, END_SYSEX, REPORT_FIRMWARE, REPORT_VERSION, START_SYSEX,
    STRING_DATA,
};
use crate::status::{FirmwareInfo, ProtocolVersion};

/// Upper bound on a buffered sysex payload.
///
/// Anything longer is a framing error (eg, a lost `END_SYSEX`), so it is discarded
/// rather than growing without limit.
const MAX_SYSEX_LEN: usize = 1024;

/// Messages sent from the board to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Message {
    /// Current input levels of an 8-pin digital port.
    DigitalPort { port: u8, mask: u16 },
    /// Reading from an analog channel. Decoded but not otherwise used.
    Analog { channel: u8, value: u16 },
    ProtocolVersion(ProtocolVersion),
    Firmware(FirmwareInfo),
    /// Free text from the firmware, usually an error description.
    StringData(String),
    /// Any other sysex message.
    Sysex { command: u8, data: Vec<u8> },
}

#[derive(Debug)]
enum Pending {
    /// A status byte that takes exactly two data bytes.
    TwoByte {
        status: u8,
        channel: u8,
        first: Option<u8>,
    },
    Sysex(Vec<u8>),
}

/// Incremental decoder for the byte stream received from the board.
///
/// Bytes are fed one at a time, as they arrive, and a message is returned once
/// its final byte has been seen. Status bytes (high bit set) start a message and
/// abandon any partial one; data bytes arriving with no message in progress are
/// dropped. This lets the decoder resynchronise after joining a stream mid-message.
#[derive(Debug, Default)]
pub(crate) struct Decoder {
    pending: Option<Pending>,
}

impl Decoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed the next received byte.
    pub(crate) fn feed(&mut self, byte: u8) -> Option<Message> {
        if byte & 0x80 != 0 {
            self.status_byte(byte)
        } else {
            self.data_byte(byte)
        }
    }

    fn status_byte(&mut self, byte: u8) -> Option<Message> {
        if byte == END_SYSEX {
            return match self.pending.take() {
                Some(Pending::Sysex(data)) => finish_sysex(data),
                _ => None,
            };
        }
        if self.pending.is_some() {
            log::trace!("Abandoning partial message at status byte {byte:#04X}");
        }

        self.pending = match byte {
            START_SYSEX => Some(Pending::Sysex(Vec::new())),
            REPORT_VERSION => Some(Pending::TwoByte {
                status: REPORT_VERSION,
                channel: 0,
                first: None,
            }),
            _ if byte < START_SYSEX
                && matches!(byte & 0xF0, DIGITAL_MESSAGE | ANALOG_MESSAGE) =>
            {
                Some(Pending::TwoByte {
                    status: byte & 0xF0,
                    channel: byte & 0x0F,
                    first: None,
                })
            }
            _ => {
                log::trace!("Ignoring unhandled status byte {byte:#04X}");
                None
            }
        };
        None
    }

    fn data_byte(&mut self, byte: u8) -> Option<Message> {
        match &mut self.pending {
            None => {
                log::trace!("Dropping stray data byte {byte:#04X}");
                None
            }
            Some(Pending::Sysex(data)) => {
                if data.len() >= MAX_SYSEX_LEN {
                    log::debug!("Discarding oversized sysex message");
                    self.pending = None;
                } else {
                    data.push(byte);
                }
                None
            }
            Some(Pending::TwoByte {
                first: first @ None,
                ..
            }) => {
                *first = Some(byte);
                None
            }
            Some(Pending::TwoByte {
                status,
                channel,
                first: Some(first),
            }) => {
                let message = two_byte_message(*status, *channel, *first, byte);
                self.pending = None;
                Some(message)
            }
        }
    }
}

fn two_byte_message(status: u8, channel: u8, first: u8, second: u8) -> Message {
    match status {
        DIGITAL_MESSAGE => Message::DigitalPort {
            port: channel,
            mask: join_14_bit(first, second),
        },
        ANALOG_MESSAGE => Message::Analog {
            channel,
            value: join_14_bit(first, second),
        },
        REPORT_VERSION => Message::ProtocolVersion(ProtocolVersion {
            major: first,
            minor: second,
        }),
        _ => unreachable!("Only two-byte statuses are stored as pending."),
    }
}

fn finish_sysex(data: Vec<u8>) -> Option<Message> {
    let (&command, payload) = data.split_first()?;
    let message = match command {
        REPORT_FIRMWARE if payload.len() >= 2 => Message::Firmware(FirmwareInfo {
            major: payload[0],
            minor: payload[1],
            name: decode_two_byte_string(&payload[2..]),
        }),
        STRING_DATA => Message::StringData(decode_two_byte_string(payload)),
        _ => Message::Sysex {
            command,
            data: payload.to_vec(),
        },
    };
    Some(message)
}
