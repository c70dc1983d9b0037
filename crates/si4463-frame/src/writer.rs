use std::io::{ErrorKind, Write};

use crate::error::{ChannelError, Result};

/// Write a complete request to the stream and flush it (blocking).
///
/// Interrupted and would-block writes are re-issued. A write that accepts
/// zero bytes means the bridge went away.
pub(crate) fn write_request<W: Write>(inner: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match inner.write(&buf[offset..]) {
            Ok(0) => return Err(ChannelError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(ChannelError::Io(err)),
        }
    }

    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(ChannelError::Io(err)),
        }
    }
}
