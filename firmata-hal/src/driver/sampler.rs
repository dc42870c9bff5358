use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::state::BoardState;
use crate::Error;
use crate::message::{Decoder, Message};

/// Background thread that keeps the cached board state fresh.
///
/// The sampler owns the read half of the link. It decodes everything the board
/// sends and applies it to the shared [`BoardState`]. It exits when asked to stop,
/// when the link reaches end of stream, or on any read error other than a timeout,
/// and clears [`BoardState::sampling`] on the way out.
#[derive(Debug)]
pub(crate) struct Sampler {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Sampler {
    pub(crate) fn spawn<R>(reader: R, state: Arc<Mutex<BoardState>>) -> Result<Self, Error>
    where
        R: Read + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = thread::Builder::new()
            .name("firmata-sampler".into())
            .spawn({
                let stop = Arc::clone(&stop);
                move || run(reader, &state, &stop)
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the sampler to exit and wait for it.
    ///
    /// The sampler notices the request after its current read returns, so this
    /// blocks for at most one read timeout.
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Sampler thread panicked");
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<R: Read>(mut reader: R, state: &Mutex<BoardState>, stop: &AtomicBool) {
    log::debug!("Sampler started");
    let mut decoder = Decoder::new();
    let mut buffer = [0u8; 64];

    while !stop.load(Ordering::Relaxed) {
        let received = match reader.read(&mut buffer) {
            Ok(0) => {
                log::warn!("Link to the board closed");
                break;
            }
            Ok(n) => &buffer[..n],
            Err(e) if is_transient(e.kind()) => continue,
            Err(e) => {
                log::error!("Failed to read from the board: {e}");
                break;
            }
        };
        log::trace!("Received {:02X?}", received);

        let messages: Vec<Message> = received.iter().filter_map(|b| decoder.feed(*b)).collect();
        if messages.is_empty() {
            continue;
        }
        let Ok(mut state) = state.lock() else {
            log::error!("Board state lock poisoned, stopping sampler");
            break;
        };
        for message in messages {
            log_message(&message);
            state.apply(message);
        }
    }

    match state.lock() {
        Ok(mut state) => state.sampling = false,
        Err(poisoned) => poisoned.into_inner().sampling = false,
    }
    log::debug!("Sampler stopped");
}

/// Read errors that just mean "nothing yet".
fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

fn log_message(message: &Message) {
    match message {
        Message::ProtocolVersion(version) => log::info!("Board speaks Firmata {version}"),
        Message::Firmware(firmware) => log::info!("Board firmware: {firmware}"),
        Message::StringData(text) => log::warn!("Board says: {text}"),
        Message::DigitalPort { port, mask } => {
            log::trace!("Port {port} reported {mask:#010b}")
        }
        Message::Analog { channel, value } => {
            log::trace!("Ignoring analog channel {channel} reading {value}")
        }
        Message::Sysex { command, data } => {
            log::trace!("Ignoring sysex {command:#04X} ({} bytes)", data.len())
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::gpio::{LogicLevel, PinMode};
    use crate::layout::Layout;

    fn state_with_reporting_input(pin: u8) -> Mutex<BoardState> {
        let mut state = BoardState::new(&Layout::ARDUINO_UNO);
        state.pins[usize::from(pin)].mode = PinMode::Input;
        state.reporting[0] = true;
        Mutex::new(state)
    }

    #[test]
    fn applies_reports_until_end_of_stream() {
        let state = state_with_reporting_input(2);
        let stream = Cursor::new(vec![0xF9, 2, 5, 0x90, 0x04, 0x00]);
        run(stream, &state, &AtomicBool::new(false));

        let state = state.into_inner().unwrap();
        assert!(!state.sampling);
        assert_eq!(state.pins[2].reported, Some(LogicLevel::High));
        assert!(state.protocol_version.is_some());
    }

    #[test]
    fn stop_flag_is_checked_before_reading() {
        let state = state_with_reporting_input(2);
        let stream = Cursor::new(vec![0x90, 0x04, 0x00]);
        run(stream, &state, &AtomicBool::new(true));

        let state = state.into_inner().unwrap();
        assert!(!state.sampling);
        assert_eq!(state.pins[2].reported, None);
    }

    #[test]
    fn timeouts_are_transient() {
        assert!(is_transient(ErrorKind::TimedOut));
        assert!(is_transient(ErrorKind::WouldBlock));
        assert!(!is_transient(ErrorKind::BrokenPipe));
    }
}
