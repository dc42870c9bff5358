use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking delay on the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }
}
