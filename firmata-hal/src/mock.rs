//! In-memory link for driving a [`Board`] without hardware.
//!
//! [`link`] returns a reader and writer to hand to [`Board::from_link`], plus a
//! [`MockBoard`] that plays the part of the firmware: it can push bytes to the
//! host and inspect everything the host wrote.
//!
//! Only built with the `mock` feature.
//!
//! ```
//! use firmata_hal::{Board, Layout, mock};
//!
//! let (device, reader, writer) = mock::link();
//! let board = Board::from_link(reader, writer, Layout::ARDUINO_UNO).unwrap();
//! board.query_version().unwrap();
//! assert_eq!(device.written(), [0xF9]);
//! ```
//!
//! [`Board`]: crate::Board
//! [`Board::from_link`]: crate::Board::from_link

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How long a [`MockReader`] waits for data before reporting a timeout.
const READ_TIMEOUT: Duration = Duration::from_millis(5);

/// Create a connected mock device, reader and writer.
pub fn link() -> (MockBoard, MockReader, MockWriter) {
    let (tx, rx) = mpsc::channel();
    let written = Arc::new(Mutex::new(Vec::new()));
    let fail_writes = Arc::new(AtomicBool::new(false));
    let device = MockBoard {
        to_host: Some(tx),
        written: Arc::clone(&written),
        fail_writes: Arc::clone(&fail_writes),
    };
    let reader = MockReader {
        from_device: rx,
        buffered: VecDeque::new(),
    };
    let writer = MockWriter {
        written,
        fail_writes,
    };
    (device, reader, writer)
}

/// The device end of a mock link.
#[derive(Debug)]
pub struct MockBoard {
    to_host: Option<Sender<Vec<u8>>>,
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockBoard {
    /// Send raw bytes to the host.
    ///
    /// Does nothing once the link has been disconnected.
    pub fn send(&self, bytes: &[u8]) {
        if let Some(tx) = &self.to_host {
            // The host may already have gone away, which is fine for a test.
            let _ = tx.send(bytes.to_vec());
        }
    }

    /// Send a digital port report.
    pub fn report_port(&self, port: u8, mask: u8) {
        self.send(&[0x90 | (port & 0x0F), mask & 0x7F, mask >> 7]);
    }

    /// Send the protocol version, as StandardFirmata does on start-up.
    pub fn report_version(&self, major: u8, minor: u8) {
        self.send(&[0xF9, major, minor]);
    }

    /// Everything the host has written so far.
    pub fn written(&self) -> Vec<u8> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Everything the host has written since the last call, clearing the record.
    pub fn take_written(&self) -> Vec<u8> {
        self.written
            .lock()
            .map(|mut w| std::mem::take(&mut *w))
            .unwrap_or_default()
    }

    /// Make every subsequent host write fail with a broken pipe error.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::Relaxed);
    }

    /// Close the device-to-host direction, as if the cable were pulled.
    ///
    /// The host's reader sees end of stream once buffered bytes are consumed.
    pub fn disconnect(&mut self) {
        self.to_host = None;
    }
}

/// The host's read half of a mock link.
#[derive(Debug)]
pub struct MockReader {
    from_device: Receiver<Vec<u8>>,
    buffered: VecDeque<u8>,
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buffered.is_empty() {
            match self.from_device.recv_timeout(READ_TIMEOUT) {
                Ok(bytes) => self.buffered.extend(bytes),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }
        let n = buf.len().min(self.buffered.len());
        for (slot, byte) in buf.iter_mut().zip(self.buffered.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// The host's write half of a mock link.
#[derive(Debug)]
pub struct MockWriter {
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: Arc<AtomicBool>,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock link failed"));
        }
        self.written
            .lock()
            .map_err(|_| io::Error::other("mock record poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Poll `condition` until it holds or `timeout` passes.
///
/// The sampler applies reports on its own thread, so tests use this to wait for
/// a report to land. Returns whether the condition was met.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}
