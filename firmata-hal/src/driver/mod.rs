use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::commands::FirmataCommand;
use crate::constants::DEFAULT_BAUD_RATE;
use crate::error::Error;
use crate::layout::Layout;
use crate::status::{FirmwareInfo, ProtocolVersion};

use sampler::Sampler;
use state::BoardState;

mod gpio;
mod sampler;
mod state;

/// Options for opening a serial connection to a board.
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    /// Serial baud rate. StandardFirmata uses 57,600.
    pub baud_rate: u32,
    /// Pin layout of the connected board.
    pub layout: Layout,
    /// Time to wait after opening the port before using the board.
    ///
    /// Most Arduino boards reset when the serial port is opened and ignore
    /// commands until their bootloader hands over to the firmware.
    pub settle_time: Duration,
    /// Serial read timeout.
    ///
    /// This bounds how long dropping the [`Board`] waits for the sampler thread.
    pub read_timeout: Duration,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            layout: Layout::ARDUINO_UNO,
            settle_time: Duration::from_secs(5),
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Driver for a board running Firmata firmware.
///
/// # Quick start
///
/// Open the board with [`Board::connect`], or [`Board::connect_with_settings`] for a
/// different baud rate or board layout. Then take digital pins with
/// [`Board::digital_pin`] and convert them into [`Input`] or [`Output`] types, which
/// implement the appropriate traits from [`embedded_hal::digital`].
///
/// [`Input`]: crate::gpio::Input
/// [`Output`]: crate::gpio::Output
///
/// # Sampling
///
/// Connecting starts a background thread that reads everything the board sends
/// and caches it. Input pins return the most recently reported level rather than
/// querying the board, so reporting must be enabled with
/// [`Input::enable_reporting`] before reads return anything.
///
/// [`Input::enable_reporting`]: crate::gpio::Input::enable_reporting
///
/// Dropping the board stops the sampler and closes the link.
pub struct Board {
    /// Write half of the link.
    writer: Mutex<Box<dyn Write + Send>>,
    /// State shared with the sampler.
    ///
    /// Lock order is state, then writer. The sampler only takes the state lock.
    state: Arc<Mutex<BoardState>>,
    layout: Layout,
    sampler: Sampler,
}

impl Board {
    ////////////////////////////////////////////////////////////////////////////////
    // Constructors
    ////////////////////////////////////////////////////////////////////////////////

    /// Connect to an Arduino Uno (or compatible) running StandardFirmata.
    ///
    /// `port` is the serial port name, such as `COM3` or `/dev/ttyACM0`. This waits
    /// five seconds for the board to reset after the port is opened.
    ///
    /// # Errors
    ///
    /// An error will be returned if the serial port cannot be opened.
    pub fn connect(port: &str) -> Result<Self, Error> {
        Self::connect_with_settings(port, &ConnectSettings::default())
    }

    /// Connect to a board with the given serial settings and layout.
    ///
    /// # Errors
    ///
    /// An error will be returned if the serial port cannot be opened.
    pub fn connect_with_settings(port: &str, settings: &ConnectSettings) -> Result<Self, Error> {
        let serial = serialport::new(port, settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()?;
        let reader = serial.try_clone()?;
        log::info!("Opened {port} at {} baud", settings.baud_rate);

        let board = Self::from_link(reader, serial, settings.layout)?;
        if !settings.settle_time.is_zero() {
            log::debug!("Waiting {:?} for the board to start", settings.settle_time);
            thread::sleep(settings.settle_time);
        }
        Ok(board)
    }

    /// Drive a board over an already-open link.
    ///
    /// `reader` is handed to the sampler thread. Its reads should time out
    /// periodically (returning [`std::io::ErrorKind::TimedOut`]) so the sampler
    /// can notice when the board is dropped. End of stream stops the sampler.
    ///
    /// # Errors
    ///
    /// An error will be returned if the sampler thread cannot be started.
    pub fn from_link<R, W>(reader: R, writer: W, layout: Layout) -> Result<Self, Error>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let state = Arc::new(Mutex::new(BoardState::new(&layout)));
        let sampler = Sampler::spawn(reader, Arc::clone(&state))?;
        Ok(Self {
            writer: Mutex::new(Box::new(writer)),
            state,
            layout,
            sampler,
        })
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Link
    ////////////////////////////////////////////////////////////////////////////////

    /// Encode and write a single command to the board.
    fn send(&self, command: &FirmataCommand) -> Result<(), Error> {
        let bytes = command.encode()?;
        log::trace!("Sending {command:?} as {bytes:02X?}");
        let mut writer = self.writer.lock()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Board information
    ////////////////////////////////////////////////////////////////////////////////

    /// The pin layout this driver was created with.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether the sampler is still receiving from the board.
    ///
    /// Once this is false, input pin reads fail with [`Error::SamplerStopped`].
    pub fn is_sampling(&self) -> bool {
        self.state.lock().map(|s| s.sampling).unwrap_or(false)
    }

    /// Firmata protocol version last reported by the board, if any.
    pub fn protocol_version(&self) -> Result<Option<ProtocolVersion>, Error> {
        Ok(self.state.lock()?.protocol_version)
    }

    /// Firmware name and version last reported by the board, if any.
    pub fn firmware(&self) -> Result<Option<FirmwareInfo>, Error> {
        Ok(self.state.lock()?.firmware.clone())
    }

    /// Ask the board to report its protocol version.
    ///
    /// The answer arrives asynchronously; check [`Board::protocol_version`].
    pub fn query_version(&self) -> Result<(), Error> {
        self.send(&FirmataCommand::ReportVersion)
    }

    /// Ask the board to report its firmware name and version.
    ///
    /// The answer arrives asynchronously; check [`Board::firmware`].
    pub fn query_firmware(&self) -> Result<(), Error> {
        self.send(&FirmataCommand::QueryFirmware)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Raw messages
    ////////////////////////////////////////////////////////////////////////////////

    /// Send a sysex message.
    ///
    /// The command and every data byte must be below 0x80. Use
    /// [`encode_two_byte_string`] for text payloads.
    ///
    /// [`encode_two_byte_string`]: crate::encode_two_byte_string
    ///
    /// # Errors
    ///
    /// [`Error::DataByteOutOfRange`] if a byte has its high bit set.
    pub fn send_sysex(&self, command: u8, data: &[u8]) -> Result<(), Error> {
        self.send(&FirmataCommand::Sysex {
            command,
            data: data.to_vec(),
        })
    }

    /// Reset the firmware to its power-up state.
    ///
    /// All pins return to their default modes and reporting is switched off.
    /// Pin handles that are still held will fail with [`Error::PinModeChanged`]
    /// until they are reconfigured.
    pub fn system_reset(&self) -> Result<(), Error> {
        let mut state = self.state.lock()?;
        self.send(&FirmataCommand::SystemReset)?;
        state.reset_pins();
        Ok(())
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("layout", &self.layout)
            .field("sampling", &self.is_sampling())
            .finish_non_exhaustive()
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        self.sampler.stop();
        log::debug!("Board closed");
    }
}
