use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Baud rate the bridge firmware runs its UART at.
pub const DEFAULT_BAUD_RATE: u32 = 230_400;

/// Serial line settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed. Default: 230400.
    pub baud_rate: u32,
    /// How long a single blocking read may wait before returning
    /// `TimedOut`. Callers that want to block forever retry on it.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(500),
        }
    }
}

/// A connected bridge stream. Implements `Read` and `Write`.
///
/// The port is opened 8N1 without flow control. On Unix the TTY is opened
/// exclusively, so a second process cannot talk to the same bridge.
pub struct SerialStream {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialStream {
    /// Open a bridge port with default settings.
    pub fn open(port: &str) -> Result<Self> {
        Self::open_with_config(port, &SerialConfig::default())
    }

    /// Open a bridge port with explicit settings.
    pub fn open_with_config(port: &str, config: &SerialConfig) -> Result<Self> {
        let opened = serialport::new(port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: port.to_string(),
                source,
            })?;

        info!(port, baud = config.baud_rate, "opened serial port");

        Ok(Self {
            port: opened,
            name: port.to_string(),
        })
    }

    /// Drop any bytes the bridge sent that nobody read yet.
    pub fn discard_input(&self) -> Result<()> {
        debug!(port = %self.name, "discarding pending input");
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(TransportError::Configure)
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("port", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_bridge_firmware() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, 230_400);
        assert!(cfg.read_timeout > Duration::ZERO);
    }

    #[test]
    #[cfg(unix)]
    fn open_missing_port_reports_port_name() {
        let err = SerialStream::open("/dev/si4463-test-missing-port").unwrap_err();
        match err {
            TransportError::Open { port, .. } => {
                assert_eq!(port, "/dev/si4463-test-missing-port")
            }
            other => panic!("expected open error, got {other:?}"),
        }
    }
}
