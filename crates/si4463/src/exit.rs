use std::fmt;
use std::io;

use si4463_chat::{ChatError, TurnError};
use si4463_driver::{ConfigError, DriverError};
use si4463_frame::ChannelError;
use si4463_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = io_kind_code(err.kind());
    CliError::new(code, format!("{context}: {err}"))
}

fn io_kind_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => {
            TRANSPORT_ERROR
        }
        _ => INTERNAL,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = err.io_kind().map_or(TRANSPORT_ERROR, io_kind_code);
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Transport(err) => transport_error(context, err),
        ChannelError::Io(source) => io_error(context, source),
        ChannelError::Encoding(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        ChannelError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        ChannelError::ConnectionClosed => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
    }
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    match err {
        ConfigError::Read { ref source, .. } if source.kind() == io::ErrorKind::NotFound => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        ConfigError::Read { source, path } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        ConfigError::InvalidLiteral { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn driver_error(context: &str, err: DriverError) -> CliError {
    match err {
        DriverError::Channel(err) => channel_error(context, err),
        DriverError::Config(err) => config_error(context, err),
        DriverError::ProtocolMismatch { .. }
        | DriverError::ShortResponse { .. }
        | DriverError::UnknownState(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        DriverError::PollLimit { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        DriverError::Cancelled => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn chat_error(context: &str, err: ChatError) -> CliError {
    match err {
        ChatError::Driver(err) => driver_error(context, err),
        ChatError::Turn(TurnError::CoordinationTimeout(_)) => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        ChatError::MessageTooLong { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        ChatError::Spawn(source) => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    #[test]
    fn missing_config_is_a_usage_error() {
        let err = ConfigError::Read {
            path: PathBuf::from("radio_config.h"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(config_error("load failed", err).code, USAGE);
    }

    #[test]
    fn nested_errors_keep_their_codes() {
        let err = ChatError::Driver(DriverError::Channel(ChannelError::Timeout(
            Duration::from_secs(1),
        )));
        assert_eq!(chat_error("send failed", err).code, TIMEOUT);

        let err = DriverError::ProtocolMismatch {
            expected: 0x4463,
            found: 0x4460,
        };
        let cli = driver_error("bring-up failed", err);
        assert_eq!(cli.code, DATA_INVALID);
        assert!(cli.message.starts_with("bring-up failed: "));
    }

    #[test]
    fn oversized_message_is_a_usage_error() {
        let err = ChatError::MessageTooLong { len: 70, max: 63 };
        assert_eq!(chat_error("send failed", err).code, USAGE);
    }

    #[test]
    fn serial_open_failures_map_through_the_os_error() {
        let err = ChannelError::Transport(TransportError::Open {
            port: "/dev/ttyUSB0".to_string(),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                "denied",
            ),
        });
        assert_eq!(channel_error("open failed", err).code, PERMISSION_DENIED);

        let err = TransportError::Open {
            port: "/dev/ttyUSB0".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "gone"),
        };
        let cli = transport_error("open failed", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert_eq!(
            cli.message,
            "open failed: failed to open /dev/ttyUSB0: gone"
        );
    }

    #[test]
    fn permission_denied_maps_to_50() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(io_error("open", err).code, PERMISSION_DENIED);
    }
}
