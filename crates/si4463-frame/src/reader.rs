use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use crate::error::{ChannelError, Result};

/// Fill `buf` completely from the stream (blocking).
///
/// Serial ports report an idle read as `TimedOut` (or `WouldBlock`); those
/// are retried until `timeout` has elapsed, or forever when it is `None`.
/// EOF before the buffer is full is `ConnectionClosed`.
pub(crate) fn read_response<R: Read>(
    inner: &mut R,
    buf: &mut [u8],
    timeout: Option<Duration>,
) -> Result<()> {
    let deadline = timeout.map(|timeout| (Instant::now() + timeout, timeout));
    let mut filled = 0usize;

    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => return Err(ChannelError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                if let Some((deadline, timeout)) = deadline {
                    if Instant::now() >= deadline {
                        return Err(ChannelError::Timeout(timeout));
                    }
                }
            }
            Err(err) => return Err(ChannelError::Io(err)),
        }
    }
    Ok(())
}
