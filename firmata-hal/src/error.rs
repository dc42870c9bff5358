/// Wrapper for problems when communicating with a Firmata board.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The serial port could not be opened or configured.
    #[error("serial port error")]
    Serial(#[from] serialport::Error),
    /// Writing to the link failed.
    #[error("failed to write to the board")]
    Io(#[from] std::io::Error),
    /// The pin number does not exist in the board layout.
    #[error("digital pin {0} does not exist on this board")]
    InvalidPin(u8),
    /// The pin exists but is reserved by the board layout.
    ///
    /// On most boards these are pins 0 and 1, which carry the serial link itself.
    #[error("digital pin {0} is reserved and cannot be used through Firmata")]
    PinUnavailable(u8),
    /// The pin is already held by another [`DigitalPin`].
    ///
    /// [`DigitalPin`]: crate::gpio::DigitalPin
    #[error("digital pin {0} is already in use")]
    PinAlreadyTaken(u8),
    /// The pin is no longer in the mode its handle expects.
    ///
    /// This happens after [`Board::system_reset`], which returns every pin to its
    /// power-up mode.
    ///
    /// [`Board::system_reset`]: crate::Board::system_reset
    #[error("digital pin {0} is no longer configured in the expected mode")]
    PinModeChanged(u8),
    /// The background sampler is no longer receiving from the board, so cached
    /// input values can no longer be trusted.
    #[error("the board is no longer being sampled")]
    SamplerStopped,
    /// A value sent to the board did not fit in a 7-bit data byte.
    #[error("value {0:#04X} does not fit in a Firmata data byte")]
    DataByteOutOfRange(u8),
    /// A character cannot be sent as a two-byte string.
    ///
    /// Only UTF-16 units below `0x4000` fit in a pair of 7-bit bytes.
    #[error("character {0:?} cannot be encoded as a Firmata string")]
    UnencodableChar(char),
    /// A thread panicked while holding the board state lock.
    #[error("board state lock poisoned")]
    StatePoisoned,
}

#[doc(hidden)]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::StatePoisoned
    }
}
