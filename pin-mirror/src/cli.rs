use std::time::Duration;

use clap::{Parser, ValueEnum};
use firmata_hal::{ConnectSettings, Layout};

use crate::mirror::Mode;

/// Mirror a push button onto a light through a Firmata board
///
/// Connects to a board running StandardFirmata over a serial port, reads the
/// button's digital input pin and drives the light's digital output pin from
/// it, polling at a fixed period until interrupted.
///
/// In mirror mode the light is on while the button is held. In toggle mode
/// each press switches the light on or off.
///
/// Set RUST_LOG=debug to see light changes, or RUST_LOG=trace for every byte
/// exchanged with the board.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// Serial port the board is connected to
    #[arg(short, long, default_value = "COM3")]
    pub(crate) port: String,
    /// Serial baud rate
    #[arg(short, long, default_value_t = 57_600)]
    pub(crate) baud: u32,
    /// Digital pin the button is wired to
    #[arg(short = 'i', long, default_value_t = 2)]
    pub(crate) input_pin: u8,
    /// Digital pin the light is wired to
    #[arg(short = 'o', long, default_value_t = 8)]
    pub(crate) output_pin: u8,
    /// Polling period in milliseconds
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) period_ms: u32,
    /// Time to wait for the board to reset after opening the port, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    pub(crate) settle_ms: u64,
    /// Board pin layout
    #[arg(long, value_enum, default_value_t = BoardKind::Uno)]
    pub(crate) board: BoardKind,
    /// How the light responds to the button
    #[arg(short, long, value_enum, default_value_t = Mode::Mirror)]
    pub(crate) mode: Mode,
}

impl Cli {
    pub(crate) fn connect_settings(&self) -> ConnectSettings {
        ConnectSettings {
            baud_rate: self.baud,
            layout: self.board.into(),
            settle_time: Duration::from_millis(self.settle_ms),
            ..ConnectSettings::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BoardKind {
    /// Arduino Uno, Nano and other ATmega328 boards.
    Uno,
    /// Arduino Mega 2560.
    Mega,
}

impl From<BoardKind> for Layout {
    fn from(value: BoardKind) -> Self {
        match value {
            BoardKind::Uno => Layout::ARDUINO_UNO,
            BoardKind::Mega => Layout::ARDUINO_MEGA,
        }
    }
}
