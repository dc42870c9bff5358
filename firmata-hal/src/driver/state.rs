use bit_field::BitField;

use crate::gpio::{LogicLevel, PinMode};
use crate::layout::Layout;
use crate::message::Message;
use crate::status::{FirmwareInfo, ProtocolVersion};

/// Host-side record of one digital pin.
#[derive(Debug, Clone)]
pub(crate) struct PinState {
    pub(crate) mode: PinMode,
    /// Last level reported by the board. `None` until the first report arrives.
    pub(crate) reported: Option<LogicLevel>,
    /// Level the host last asked this pin to output.
    pub(crate) output: LogicLevel,
    /// Held by a `DigitalPin` handle.
    pub(crate) taken: bool,
}

impl PinState {
    fn new(reserved: bool) -> Self {
        Self {
            mode: if reserved {
                PinMode::Unavailable
            } else {
                PinMode::Unset
            },
            reported: None,
            output: LogicLevel::Low,
            taken: false,
        }
    }
}

/// Everything the host knows about the board, shared with the sampler.
#[derive(Debug)]
pub(crate) struct BoardState {
    pub(crate) pins: Vec<PinState>,
    /// Reporting enabled, per digital port.
    pub(crate) reporting: Vec<bool>,
    pub(crate) protocol_version: Option<ProtocolVersion>,
    pub(crate) firmware: Option<FirmwareInfo>,
    /// Cleared when the sampler exits.
    pub(crate) sampling: bool,
}

impl BoardState {
    pub(crate) fn new(layout: &Layout) -> Self {
        Self {
            pins: (0..layout.digital_pins)
                .map(|pin| PinState::new(layout.is_reserved(pin)))
                .collect(),
            reporting: vec![false; usize::from(layout.ports())],
            protocol_version: None,
            firmware: None,
            sampling: true,
        }
    }

    /// Update the cached state from a message received from the board.
    pub(crate) fn apply(&mut self, message: Message) {
        match message {
            Message::DigitalPort { port, mask } => self.update_port(port, mask),
            Message::ProtocolVersion(version) => self.protocol_version = Some(version),
            Message::Firmware(firmware) => self.firmware = Some(firmware),
            Message::Analog { .. } | Message::StringData(_) | Message::Sysex { .. } => {}
        }
    }

    fn update_port(&mut self, port: u8, mask: u16) {
        if !self.reporting.get(usize::from(port)).copied().unwrap_or(false) {
            return;
        }
        for bit in 0..8 {
            let pin = usize::from(port) * 8 + bit;
            if let Some(state) = self.pins.get_mut(pin) {
                if state.mode == PinMode::Input {
                    state.reported = Some(mask.get_bit(bit).into());
                }
            }
        }
    }

    /// Port bitmask of the requested output levels of every output pin in `port`.
    pub(crate) fn output_mask(&self, port: u8) -> u8 {
        let mut mask = 0u8;
        let first = usize::from(port) * 8;
        for (offset, state) in self.pins.iter().skip(first).take(8).enumerate() {
            if state.mode == PinMode::Output {
                mask.set_bit(offset, state.output.is_high());
            }
        }
        mask
    }

    /// Forget pin modes and reports, as after a firmware reset.
    pub(crate) fn reset_pins(&mut self) {
        for state in &mut self.pins {
            if state.mode != PinMode::Unavailable {
                state.mode = PinMode::Unset;
            }
            state.reported = None;
            state.output = LogicLevel::Low;
        }
        self.reporting.iter_mut().for_each(|r| *r = false);
    }
}
