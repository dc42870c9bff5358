use super::Board;
use crate::Error;
use crate::commands::FirmataCommand;
use crate::gpio::{DigitalPin, LogicLevel, PinMode};
use crate::layout::port_of;

impl Board {
    /// Take a digital pin for GPIO operation.
    ///
    /// Each pin can be held by one [`DigitalPin`] at a time. Dropping the pin (or
    /// the [`Input`] or [`Output`] made from it) releases it. Taking a pin does not
    /// change anything on the board.
    ///
    /// [`Input`]: crate::gpio::Input
    /// [`Output`]: crate::gpio::Output
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPin`] if the layout has no such pin.
    /// - [`Error::PinUnavailable`] if the layout reserves the pin.
    /// - [`Error::PinAlreadyTaken`] if the pin is already held.
    pub fn digital_pin(&self, pin: u8) -> Result<DigitalPin<'_>, Error> {
        let mut state = self.state.lock()?;
        let record = state
            .pins
            .get_mut(usize::from(pin))
            .ok_or(Error::InvalidPin(pin))?;
        if record.mode == PinMode::Unavailable {
            return Err(Error::PinUnavailable(pin));
        }
        if record.taken {
            return Err(Error::PinAlreadyTaken(pin));
        }
        record.taken = true;
        Ok(DigitalPin::new(self, pin))
    }

    /// Hand a pin back so it can be taken again.
    pub(crate) fn release_pin(&self, pin: u8) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(record) = state.pins.get_mut(usize::from(pin)) {
            record.taken = false;
        }
    }

    /// Set a pin's mode on the board and in the cached state.
    ///
    /// A pin switched to output starts low, and its port is rewritten so the
    /// board agrees.
    pub(crate) fn set_pin_mode(&self, pin: u8, mode: PinMode) -> Result<(), Error> {
        let code = mode
            .wire_code()
            .expect("Only input and output modes are sent to the board.");
        let mut state = self.state.lock()?;
        self.send(&FirmataCommand::SetPinMode { pin, mode: code })?;
        let record = &mut state.pins[usize::from(pin)];
        record.mode = mode;
        record.reported = None;
        record.output = LogicLevel::Low;
        log::debug!("Pin {pin} set to {mode:?}");

        if mode == PinMode::Output {
            let port = port_of(pin);
            let mask = state.output_mask(port);
            self.send(&FirmataCommand::DigitalPortWrite { port, mask })?;
        }
        Ok(())
    }

    /// Turn reporting on or off for the port containing `pin`.
    ///
    /// Reporting is per port, so this affects every input pin sharing the port.
    pub(crate) fn set_port_reporting(&self, pin: u8, enable: bool) -> Result<(), Error> {
        let port = port_of(pin);
        let mut state = self.state.lock()?;
        self.send(&FirmataCommand::ReportDigital { port, enable })?;
        state.reporting[usize::from(port)] = enable;
        log::debug!("Reporting for port {port} (pin {pin}) set to {enable}");
        Ok(())
    }

    /// Most recently reported level of an input pin.
    pub(crate) fn input_level(&self, pin: u8) -> Result<Option<LogicLevel>, Error> {
        let state = self.state.lock()?;
        if !state.sampling {
            return Err(Error::SamplerStopped);
        }
        let record = &state.pins[usize::from(pin)];
        if record.mode != PinMode::Input {
            return Err(Error::PinModeChanged(pin));
        }
        Ok(record.reported)
    }

    /// Drive an output pin, by rewriting its whole port.
    pub(crate) fn write_output(&self, pin: u8, level: LogicLevel) -> Result<(), Error> {
        let port = port_of(pin);
        let mut state = self.state.lock()?;
        let record = &mut state.pins[usize::from(pin)];
        if record.mode != PinMode::Output {
            return Err(Error::PinModeChanged(pin));
        }
        let previous = std::mem::replace(&mut record.output, level);
        let mask = state.output_mask(port);
        // Sent under the state lock so port writes reach the board in mask order.
        let sent = self.send(&FirmataCommand::DigitalPortWrite { port, mask });
        if sent.is_err() {
            state.pins[usize::from(pin)].output = previous;
        }
        sent
    }

    /// Level an output pin was last set to.
    pub(crate) fn output_level(&self, pin: u8) -> Result<LogicLevel, Error> {
        let state = self.state.lock()?;
        let record = &state.pins[usize::from(pin)];
        if record.mode != PinMode::Output {
            return Err(Error::PinModeChanged(pin));
        }
        Ok(record.output)
    }
}
