#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod commands;
mod constants;
mod driver;
mod error;
pub mod gpio;
pub mod layout;
mod message;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod status;

pub use commands::encode_two_byte_string;
pub use driver::{Board, ConnectSettings};
pub use error::Error;
pub use layout::Layout;
