use std::time::Duration;

/// Errors raised while assembling a request from its items.
///
/// These are caller bugs; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The items encoded to zero bytes.
    #[error("request encodes to zero bytes")]
    Empty,

    /// An integer item does not fit in one byte.
    #[error("integer {0} out of byte range (-128..=255)")]
    IntOutOfRange(i32),

    /// The encoded request does not fit the one-byte length header.
    #[error("request too long ({len} bytes, max {max})")]
    TooLong { len: usize, max: usize },
}

/// Errors that can occur while exchanging a request with the bridge.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The request could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// An I/O error occurred while writing the request or reading the response.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or configuring the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] si4463_transport::TransportError),

    /// The stream ended before the full response arrived.
    #[error("connection closed (incomplete response)")]
    ConnectionClosed,

    /// The response did not arrive within the configured deadline.
    #[error("response timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
