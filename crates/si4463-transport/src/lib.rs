//! Serial transport for the Si4463 command bridge.
//!
//! The bridge is an MCU that forwards request bytes to the radio over SPI
//! and answers over its UART. From the host it is an opaque duplex byte
//! stream: blocking writes, blocking reads.
//!
//! This is the lowest layer of the workspace. Everything else builds on top
//! of [`SerialStream`], or on any other `Read + Write` for tests.

pub mod error;
pub mod serial;

pub use error::{Result, TransportError};
pub use serial::{SerialConfig, SerialStream, DEFAULT_BAUD_RATE};
