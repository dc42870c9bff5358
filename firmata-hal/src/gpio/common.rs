#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Digital pin level.
pub enum LogicLevel {
    /// Logic 1.
    High,
    /// Logic 0.
    Low,
}

impl LogicLevel {
    /// True if the level is high.
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// True if the level is low.
    pub fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl From<bool> for LogicLevel {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}

impl From<LogicLevel> for bool {
    fn from(value: LogicLevel) -> Self {
        value.is_high()
    }
}

impl From<LogicLevel> for u8 {
    /// Convert a [`LogicLevel`] to 1 (if high) or 0 (if low).
    fn from(value: LogicLevel) -> Self {
        match value {
            LogicLevel::High => 1,
            LogicLevel::Low => 0,
        }
    }
}

/// Mode of a digital pin as tracked by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Reserved by the board layout (eg, the serial lines) and never usable.
    Unavailable,
    /// Usable but not yet configured by this host.
    Unset,
    /// Digital input.
    Input,
    /// Digital output.
    Output,
}

impl PinMode {
    /// Firmata `SET_PIN_MODE` code, for the modes that can be sent to the board.
    pub(crate) fn wire_code(self) -> Option<u8> {
        match self {
            PinMode::Input => Some(0x00),
            PinMode::Output => Some(0x01),
            PinMode::Unavailable | PinMode::Unset => None,
        }
    }
}
