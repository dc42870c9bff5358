use super::{LogicLevel, PinMode};
use crate::{Board, Error};

/// A digital pin that can be configured for input or output.
#[derive(Debug)]
pub struct DigitalPin<'a> {
    board: &'a Board,
    pin_number: u8,
}

impl<'a> DigitalPin<'a> {
    pub(crate) fn new(board: &'a Board, pin_number: u8) -> Self {
        Self { board, pin_number }
    }

    /// The pin's number on the board.
    pub fn number(&self) -> u8 {
        self.pin_number
    }

    /// Set up the pin as a digital input.
    ///
    /// Reporting is not switched on; call [`Input::enable_reporting`] before
    /// expecting a level.
    pub fn configure_as_digital_input(self) -> Result<Input<'a>, Error> {
        self.board.set_pin_mode(self.pin_number, PinMode::Input)?;
        Ok(Input(self))
    }

    /// Set up the pin as a digital output, driven low.
    ///
    /// This rewrites the pin's port, so other outputs on the port keep their
    /// levels and this pin starts low even if it was high in an earlier mode.
    pub fn configure_as_digital_output(self) -> Result<Output<'a>, Error> {
        self.board.set_pin_mode(self.pin_number, PinMode::Output)?;
        Ok(Output(self))
    }
}

impl Drop for DigitalPin<'_> {
    fn drop(&mut self) {
        self.board.release_pin(self.pin_number);
    }
}

impl<'a> TryFrom<DigitalPin<'a>> for Input<'a> {
    type Error = Error;
    fn try_from(pin: DigitalPin<'a>) -> Result<Self, Self::Error> {
        pin.configure_as_digital_input()
    }
}

impl<'a> TryFrom<DigitalPin<'a>> for Output<'a> {
    type Error = Error;
    fn try_from(pin: DigitalPin<'a>) -> Result<Self, Self::Error> {
        pin.configure_as_digital_output()
    }
}

impl<'a> From<Input<'a>> for DigitalPin<'a> {
    fn from(value: Input<'a>) -> Self {
        value.destroy()
    }
}

impl<'a> From<Output<'a>> for DigitalPin<'a> {
    fn from(value: Output<'a>) -> Self {
        value.destroy()
    }
}

/// A digital pin in input mode.
#[derive(Debug)]
pub struct Input<'a>(DigitalPin<'a>);

impl<'a> Input<'a> {
    /// Ask the board to report changes on this pin's port.
    ///
    /// Reporting is per 8-pin port: pins 0–7 are port 0, pins 8–15 port 1, and so
    /// on. Enabling it here also enables it for other inputs on the same port.
    pub fn enable_reporting(&self) -> Result<(), Error> {
        self.0.board.set_port_reporting(self.0.pin_number, true)
    }

    /// Stop the board reporting changes on this pin's port.
    ///
    /// The last reported level is kept.
    pub fn disable_reporting(&self) -> Result<(), Error> {
        self.0.board.set_port_reporting(self.0.pin_number, false)
    }

    /// Get the most recently reported level of this pin.
    ///
    /// Returns `None` until the board has reported the pin's port at least once.
    ///
    /// # Errors
    ///
    /// [`Error::SamplerStopped`] if the board is no longer being read, and
    /// [`Error::PinModeChanged`] after a [`Board::system_reset`].
    pub fn get_level(&self) -> Result<Option<LogicLevel>, Error> {
        self.0.board.input_level(self.0.pin_number)
    }

    /// The pin's number on the board.
    pub fn number(&self) -> u8 {
        self.0.pin_number
    }

    /// Return the underlying pin object, so that it can be reconfigured.
    ///
    /// This does not change anything on the board.
    pub fn destroy(self) -> DigitalPin<'a> {
        self.0
    }

    /// Switch the pin mode from input to output.
    pub fn try_into_output(self) -> Result<Output<'a>, Error> {
        self.0.configure_as_digital_output()
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_hal::digital::ErrorType for Input<'_> {
    type Error = Error;
}

/// A pin that has not reported yet is neither high nor low, so both `is_high`
/// and `is_low` return false for it.
impl embedded_hal::digital::InputPin for Input<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.get_level().map(|level| level.is_some_and(LogicLevel::is_high))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.get_level().map(|level| level.is_some_and(LogicLevel::is_low))
    }
}

/// A digital pin in output mode.
#[derive(Debug)]
pub struct Output<'a>(DigitalPin<'a>);

impl<'a> Output<'a> {
    /// Set the output level of this pin.
    pub fn set_level(&self, level: LogicLevel) -> Result<(), Error> {
        self.0.board.write_output(self.0.pin_number, level)
    }

    /// Get the currently set output level of this pin.
    pub fn get_output_level(&self) -> Result<LogicLevel, Error> {
        self.0.board.output_level(self.0.pin_number)
    }

    /// The pin's number on the board.
    pub fn number(&self) -> u8 {
        self.0.pin_number
    }

    /// Return the underlying pin object, so that it can be reconfigured.
    pub fn destroy(self) -> DigitalPin<'a> {
        self.0
    }

    /// Switch the pin mode from output to input.
    pub fn try_into_input(self) -> Result<Input<'a>, Error> {
        self.0.configure_as_digital_input()
    }
}

impl embedded_hal::digital::ErrorType for Output<'_> {
    type Error = Error;
}

impl embedded_hal::digital::OutputPin for Output<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::High)
    }
}

impl embedded_hal::digital::StatefulOutputPin for Output<'_> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.get_output_level().map(LogicLevel::is_high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.get_output_level().map(LogicLevel::is_low)
    }
}

impl<'a> TryFrom<Output<'a>> for Input<'a> {
    type Error = Error;

    fn try_from(value: Output<'a>) -> Result<Self, Self::Error> {
        value.try_into_input()
    }
}

impl<'a> TryFrom<Input<'a>> for Output<'a> {
    type Error = Error;

    fn try_from(value: Input<'a>) -> Result<Self, Self::Error> {
        value.try_into_output()
    }
}
