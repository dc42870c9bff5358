//! Digital pin layouts of common Firmata boards.

/// Which digital pins a board has, and which of them are off limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Number of digital pins, numbered from 0.
    pub digital_pins: u8,
    /// Pins that exist but cannot be used, such as the serial RX/TX lines.
    pub reserved: &'static [u8],
}

impl Layout {
    /// Arduino Uno and other ATmega328 boards.
    pub const ARDUINO_UNO: Layout = Layout {
        digital_pins: 14,
        reserved: &[0, 1],
    };

    /// Arduino Mega 2560.
    ///
    /// Pins 14 and 15 are Serial3, which StandardFirmata leaves alone.
    pub const ARDUINO_MEGA: Layout = Layout {
        digital_pins: 54,
        reserved: &[0, 1, 14, 15],
    };

    /// Number of 8-pin digital ports needed to cover every pin.
    pub fn ports(&self) -> u8 {
        self.digital_pins.div_ceil(8)
    }

    pub(crate) fn is_reserved(&self, pin: u8) -> bool {
        self.reserved.contains(&pin)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::ARDUINO_UNO
    }
}

/// Port number of a digital pin.
pub(crate) fn port_of(pin: u8) -> u8 {
    pin / 8
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn port_counts() {
        assert_eq!(Layout::ARDUINO_UNO.ports(), 2);
        assert_eq!(Layout::ARDUINO_MEGA.ports(), 7);
    }

    #[test]
    fn pin_addressing() {
        assert_eq!(port_of(2), 0);
        assert_eq!(port_of(8), 1);
        assert_eq!(port_of(13), 1);
    }
}
