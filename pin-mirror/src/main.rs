use anyhow::Context;
use clap::Parser;
use firmata_hal::Board;
use firmata_hal::gpio::{Input, Output};

use cli::Cli;
use delay::StdDelay;
use mirror::PinMirror;

mod cli;
mod delay;
mod mirror;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(&cli)
}

/// Connect, set up the pins and mirror until something fails.
fn run(cli: &Cli) -> anyhow::Result<()> {
    let board = Board::connect_with_settings(&cli.port, &cli.connect_settings())
        .with_context(|| format!("failed to connect to the board on {}", cli.port))?;
    announce(&board)?;

    let mut mirror = start(&board, cli)?;
    log::info!(
        "Driving pin {} from pin {} every {} ms ({:?} mode)",
        cli.output_pin,
        cli.input_pin,
        cli.period_ms,
        cli.mode
    );
    match mirror.run()? {}
}

/// Log the firmware if it has already reported, or ask for it.
///
/// The sampler logs the firmware report when it arrives.
fn announce(board: &Board) -> anyhow::Result<()> {
    match board.firmware()? {
        Some(firmware) => log::info!("Connected to {firmware}"),
        None => {
            log::debug!("No firmware report yet, requesting one");
            board.query_firmware()?;
        }
    }
    Ok(())
}

/// Configure the input and output pins and build the mirror loop.
fn start<'a>(
    board: &'a Board,
    cli: &Cli,
) -> anyhow::Result<PinMirror<Input<'a>, Output<'a>, StdDelay>> {
    let input = board
        .digital_pin(cli.input_pin)
        .and_then(|pin| pin.configure_as_digital_input())
        .with_context(|| format!("failed to set up input pin {}", cli.input_pin))?;
    input
        .enable_reporting()
        .with_context(|| format!("failed to enable reporting for pin {}", cli.input_pin))?;
    let output = board
        .digital_pin(cli.output_pin)
        .and_then(|pin| pin.configure_as_digital_output())
        .with_context(|| format!("failed to set up output pin {}", cli.output_pin))?;

    Ok(PinMirror::new(
        input,
        output,
        StdDelay,
        cli.period_ms,
        cli.mode,
    ))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use clap::CommandFactory;
    use firmata_hal::{Error, Layout, mock};

    use super::*;
    use crate::cli::BoardKind;
    use crate::mirror::Mode;

    const WAIT: Duration = Duration::from_secs(2);

    fn defaults() -> Cli {
        Cli::parse_from(["pin-mirror"])
    }

    #[test]
    fn check_cli_debug_asserts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_arguments() {
        let cli = defaults();
        assert_eq!(cli.port, "COM3");
        assert_eq!(cli.baud, 57_600);
        assert_eq!(cli.input_pin, 2);
        assert_eq!(cli.output_pin, 8);
        assert_eq!(cli.period_ms, 50);
        assert_eq!(cli.board, BoardKind::Uno);
        assert_eq!(cli.mode, Mode::Mirror);
        assert_eq!(cli.connect_settings().layout, Layout::ARDUINO_UNO);
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(Cli::try_parse_from(["pin-mirror", "--period-ms", "0"]).is_err());
    }

    #[test]
    fn missing_port_fails_before_touching_pins() {
        let cli = Cli::parse_from([
            "pin-mirror",
            "--port",
            "/dev/pin-mirror-no-such-port",
            "--settle-ms",
            "0",
        ]);
        let error = run(&cli).unwrap_err();
        assert!(error.to_string().contains("failed to connect"));
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::Serial(_))
        ));
    }

    #[test]
    fn start_configures_pins() {
        let (device, reader, writer) = mock::link();
        let board = Board::from_link(reader, writer, Layout::ARDUINO_UNO).unwrap();
        let _mirror = start(&board, &defaults()).unwrap();
        assert_eq!(
            device.written(),
            [0xF4, 2, 0x00, 0xD0, 1, 0xF4, 8, 0x01, 0x91, 0x00, 0x00]
        );
    }

    #[test]
    fn same_pin_for_input_and_output_is_rejected() {
        let (_device, reader, writer) = mock::link();
        let board = Board::from_link(reader, writer, Layout::ARDUINO_UNO).unwrap();
        let cli = Cli::parse_from(["pin-mirror", "-i", "8", "-o", "8"]);
        let error = start(&board, &cli).err().unwrap();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::PinAlreadyTaken(8))
        ));
    }

    #[test]
    fn mirrors_reports_onto_the_light() {
        let (device, reader, writer) = mock::link();
        let board = Board::from_link(reader, writer, Layout::ARDUINO_UNO).unwrap();
        let mut mirror = start(&board, &defaults()).unwrap();
        device.take_written();

        // Nothing reported yet: light off.
        assert!(!mirror.step().unwrap());
        assert_eq!(device.take_written(), [0x91, 0x00, 0x00]);

        device.report_port(0, 0b100);
        assert!(mock::wait_until(WAIT, || mirror.step().unwrap()));
        assert_eq!(
            device.take_written().last_chunk::<3>(),
            Some(&[0x91, 0x01, 0x00])
        );

        device.report_port(0, 0);
        assert!(mock::wait_until(WAIT, || !mirror.step().unwrap()));
        assert_eq!(
            device.take_written().last_chunk::<3>(),
            Some(&[0x91, 0x00, 0x00])
        );
    }

    #[test]
    fn lost_link_ends_the_loop() {
        let (mut device, reader, writer) = mock::link();
        let board = Board::from_link(reader, writer, Layout::ARDUINO_UNO).unwrap();
        let mut mirror = start(&board, &defaults()).unwrap();

        device.disconnect();
        assert!(mock::wait_until(WAIT, || !board.is_sampling()));
        let error = mirror.run().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::SamplerStopped)
        ));
    }
}
