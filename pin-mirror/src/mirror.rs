use std::convert::Infallible;

use anyhow::Context;
use clap::ValueEnum;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// What the light does in response to the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    /// Light is on while the button is held.
    Mirror,
    /// Each press switches the light on or off.
    Toggle,
}

/// Polls a button input and drives a light output from it at a fixed period.
///
/// Each iteration reads the input exactly once. In [`Mode::Mirror`] the output is
/// written with the level read; in [`Mode::Toggle`] the light flips on each
/// released-to-pressed transition. The output is written every iteration, even
/// when unchanged.
///
/// An input that has not reported yet reads as not pressed.
pub(crate) struct PinMirror<I, O, D> {
    input: I,
    output: O,
    delay: D,
    period_ms: u32,
    mode: Mode,
    /// Button state seen on the previous iteration, for edge detection.
    was_pressed: bool,
    /// Light state in toggle mode.
    light_on: bool,
    /// Last level written, for logging changes.
    last_written: Option<bool>,
}

impl<I, O, D> PinMirror<I, O, D>
where
    I: InputPin,
    I::Error: std::error::Error + Send + Sync + 'static,
    O: OutputPin,
    O::Error: std::error::Error + Send + Sync + 'static,
    D: DelayNs,
{
    pub(crate) fn new(input: I, output: O, delay: D, period_ms: u32, mode: Mode) -> Self {
        Self {
            input,
            output,
            delay,
            period_ms,
            mode,
            was_pressed: false,
            light_on: false,
            last_written: None,
        }
    }

    /// Read the input, write the output, and return the level written.
    pub(crate) fn step(&mut self) -> anyhow::Result<bool> {
        let pressed = self.input.is_high().context("failed to read input pin")?;
        let light = match self.mode {
            Mode::Mirror => pressed,
            Mode::Toggle => {
                if pressed && !self.was_pressed {
                    self.light_on = !self.light_on;
                }
                self.light_on
            }
        };
        self.was_pressed = pressed;

        self.output
            .set_state(PinState::from(light))
            .context("failed to write output pin")?;
        if self.last_written != Some(light) {
            log::debug!("Light {}", if light { "on" } else { "off" });
            self.last_written = Some(light);
        }
        Ok(light)
    }

    /// One step followed by one period of sleep.
    pub(crate) fn iterate(&mut self) -> anyhow::Result<bool> {
        let light = self.step()?;
        self.delay.delay_ms(self.period_ms);
        Ok(light)
    }

    /// Poll forever. Only returns if reading or writing a pin fails.
    pub(crate) fn run(&mut self) -> anyhow::Result<Infallible> {
        loop {
            self.iterate()?;
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use embedded_hal::digital::ErrorType;

    use super::*;

    /// Simulated time in nanoseconds, advanced only by [`SimDelay`].
    #[derive(Clone, Default)]
    struct Clock(Rc<Cell<u64>>);

    impl Clock {
        fn now_ms(&self) -> u64 {
            self.0.get() / 1_000_000
        }
    }

    struct SimDelay(Clock);

    impl DelayNs for SimDelay {
        fn delay_ns(&mut self, ns: u32) {
            let clock = &self.0.0;
            clock.set(clock.get() + u64::from(ns));
        }
    }

    /// Input whose level follows a timeline of `(from_ms, reported)` entries.
    ///
    /// `None` means the board has not reported the pin.
    struct ScriptedInput {
        clock: Clock,
        timeline: Vec<(u64, Option<bool>)>,
        reads: Rc<Cell<usize>>,
    }

    impl ScriptedInput {
        fn level(&self) -> Option<bool> {
            let now = self.clock.now_ms();
            self.reads.set(self.reads.get() + 1);
            self.timeline
                .iter()
                .take_while(|(from, _)| *from <= now)
                .last()
                .and_then(|(_, level)| *level)
        }
    }

    impl ErrorType for ScriptedInput {
        type Error = Infallible;
    }

    impl InputPin for ScriptedInput {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level() == Some(true))
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level() == Some(false))
        }
    }

    /// Output recording `(at_ms, level)` for every write.
    struct RecordingOutput {
        clock: Clock,
        writes: Rc<RefCell<Vec<(u64, bool)>>>,
    }

    impl ErrorType for RecordingOutput {
        type Error = Infallible;
    }

    impl OutputPin for RecordingOutput {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.writes.borrow_mut().push((self.clock.now_ms(), false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.writes.borrow_mut().push((self.clock.now_ms(), true));
            Ok(())
        }
    }

    struct Rig {
        mirror: PinMirror<ScriptedInput, RecordingOutput, SimDelay>,
        writes: Rc<RefCell<Vec<(u64, bool)>>>,
        reads: Rc<Cell<usize>>,
    }

    fn rig(mode: Mode, timeline: Vec<(u64, Option<bool>)>) -> Rig {
        let clock = Clock::default();
        let writes = Rc::new(RefCell::new(Vec::new()));
        let reads = Rc::new(Cell::new(0));
        let input = ScriptedInput {
            clock: clock.clone(),
            timeline,
            reads: Rc::clone(&reads),
        };
        let output = RecordingOutput {
            clock: clock.clone(),
            writes: Rc::clone(&writes),
        };
        Rig {
            mirror: PinMirror::new(input, output, SimDelay(clock), 50, mode),
            writes,
            reads,
        }
    }

    fn levels(writes: &RefCell<Vec<(u64, bool)>>) -> Vec<bool> {
        writes.borrow().iter().map(|(_, level)| *level).collect()
    }

    #[test]
    fn output_follows_input_each_iteration() {
        let mut rig = rig(
            Mode::Mirror,
            vec![
                (0, Some(true)),
                (50, Some(false)),
                (100, Some(true)),
                (150, Some(true)),
                (200, Some(false)),
            ],
        );
        for _ in 0..5 {
            rig.mirror.iterate().unwrap();
        }
        assert_eq!(levels(&rig.writes), [true, false, true, true, false]);
    }

    #[test]
    fn unchanged_input_repeats_identical_writes() {
        let mut rig = rig(Mode::Mirror, vec![(0, Some(true))]);
        for _ in 0..4 {
            assert!(rig.mirror.iterate().unwrap());
        }
        assert_eq!(levels(&rig.writes), [true; 4]);
    }

    #[test]
    fn unreported_input_drives_output_low() {
        let mut rig = rig(Mode::Mirror, vec![(0, None), (100, Some(true))]);
        assert!(!rig.mirror.iterate().unwrap());
        assert!(!rig.mirror.iterate().unwrap());
        assert!(rig.mirror.iterate().unwrap());
    }

    #[test]
    fn press_and_release_are_mirrored_within_one_period() {
        let mut rig = rig(Mode::Mirror, vec![(0, Some(true)), (100, Some(false))]);
        for _ in 0..4 {
            rig.mirror.iterate().unwrap();
        }
        let writes = rig.writes.borrow();
        let first_on = writes.iter().find(|(_, level)| *level).unwrap();
        assert!(first_on.0 <= 50);
        let first_off = writes.iter().find(|(at, level)| *at >= 100 && !level).unwrap();
        assert!(first_off.0 <= 150);
    }

    #[test]
    fn one_read_per_iteration() {
        let mut rig = rig(Mode::Toggle, vec![(0, Some(true))]);
        for _ in 0..3 {
            rig.mirror.iterate().unwrap();
        }
        assert_eq!(rig.reads.get(), 3);
    }

    #[test]
    fn toggle_flips_on_each_press() {
        // Press, hold, release, press again, release.
        let mut rig = rig(
            Mode::Toggle,
            vec![
                (0, Some(false)),
                (50, Some(true)),
                (100, Some(true)),
                (150, Some(false)),
                (200, Some(true)),
                (250, Some(false)),
            ],
        );
        for _ in 0..6 {
            rig.mirror.iterate().unwrap();
        }
        assert_eq!(levels(&rig.writes), [false, true, true, true, false, false]);
    }

    #[test]
    fn toggle_ignores_held_button() {
        let mut rig = rig(Mode::Toggle, vec![(0, Some(true))]);
        for _ in 0..5 {
            rig.mirror.iterate().unwrap();
        }
        assert_eq!(levels(&rig.writes), [true; 5]);
    }

    #[test]
    fn step_does_not_advance_time() {
        let mut rig = rig(Mode::Mirror, vec![(0, Some(false)), (50, Some(true))]);
        rig.mirror.step().unwrap();
        rig.mirror.step().unwrap();
        assert_eq!(levels(&rig.writes), [false, false]);
        assert!(rig.writes.borrow().iter().all(|(at, _)| *at == 0));
    }
}
