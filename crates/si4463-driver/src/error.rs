use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while reading a `radio_config.h` export.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A directive's value is not a byte literal this parser understands.
    #[error("line {line}: {name}: {reason}")]
    InvalidLiteral {
        line: usize,
        name: String,
        reason: String,
    },
}

/// Errors that can occur in chip operations.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Command channel error (encoding or transport).
    #[error("channel error: {0}")]
    Channel(#[from] si4463_frame::ChannelError),

    /// The chip did not identify as the expected part.
    #[error("unexpected part number 0x{found:04X} (expected 0x{expected:04X})")]
    ProtocolMismatch { expected: u16, found: u16 },

    /// A response was shorter than its decoder needs.
    #[error("short response ({got} bytes, need {expected})")]
    ShortResponse { expected: usize, got: usize },

    /// The chip reported a state value outside the known set.
    #[error("unknown chip state {0}")]
    UnknownState(u8),

    /// A status poll hit its attempt or time limit.
    #[error("status poll gave up after {attempts} attempts ({elapsed:?})")]
    PollLimit { attempts: u64, elapsed: Duration },

    /// A status poll was cancelled.
    #[error("status poll cancelled")]
    Cancelled,

    /// Radio configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
