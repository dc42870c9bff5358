//! Digital input and output on the board's pins.

mod common;
mod pins;

pub use common::{LogicLevel, PinMode};
pub use pins::{DigitalPin, Input, Output};
