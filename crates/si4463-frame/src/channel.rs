use std::io::{Read, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use si4463_transport::{SerialConfig, SerialStream};
use tracing::{debug, trace};

use crate::codec::{encode_request, Item, HEADER_SIZE};
use crate::error::Result;
use crate::reader::read_response;
use crate::writer::write_request;

/// Bridge-local command: blink the bridge LED. Sent with a zero request length.
const BRIDGE_IDENTIFY: u8 = 0x00;

/// Bridge-local command: power-cycle the radio through its shutdown pin.
const BRIDGE_RESET_CHIP: u8 = 0x01;

/// Configuration for the command channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelConfig {
    /// How long to wait for a complete response. `None` waits forever.
    pub response_timeout: Option<Duration>,
}

/// Exclusive request/response access to the bridge.
///
/// Every chip operation goes through [`CommandChannel::request`]. The
/// stream lock is held for the whole write-then-read cycle, so at most one
/// request is in flight no matter how many threads share the channel.
pub struct CommandChannel<T> {
    inner: Mutex<T>,
    config: ChannelConfig,
}

impl<T: Read + Write> CommandChannel<T> {
    /// Create a channel over a stream with default configuration.
    pub fn new(stream: T) -> Self {
        Self::with_config(stream, ChannelConfig::default())
    }

    /// Create a channel over a stream with explicit configuration.
    pub fn with_config(stream: T, config: ChannelConfig) -> Self {
        Self {
            inner: Mutex::new(stream),
            config,
        }
    }

    /// Send one request and wait for its response.
    ///
    /// With `response_len == 0` the bridge answers with a single sync byte,
    /// which is read and discarded; the returned buffer is empty.
    pub fn request(&self, items: &[Item<'_>], response_len: u8) -> Result<Bytes> {
        let mut wire = BytesMut::new();
        encode_request(items, response_len, &mut wire)?;

        debug!(
            opcode = wire[HEADER_SIZE],
            request_len = wire[0],
            response_len,
            "bridge request"
        );

        self.exchange(&wire, response_len)
    }

    /// Ask the bridge to blink its LED.
    pub fn identify(&self) -> Result<()> {
        debug!("bridge identify");
        self.exchange(&[0, BRIDGE_IDENTIFY], 0).map(|_| ())
    }

    /// Ask the bridge to power-cycle the radio.
    pub fn reset_chip(&self) -> Result<()> {
        debug!("bridge chip reset");
        self.exchange(&[0, BRIDGE_RESET_CHIP], 0).map(|_| ())
    }

    /// Consume the channel and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn exchange(&self, wire: &[u8], response_len: u8) -> Result<Bytes> {
        // A panic in another caller leaves the stream itself intact.
        let mut stream = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        write_request(&mut *stream, wire)?;

        if response_len == 0 {
            let mut sync = [0u8; 1];
            read_response(&mut *stream, &mut sync, self.config.response_timeout)?;
            trace!(sync = sync[0], "bridge ack");
            return Ok(Bytes::new());
        }

        let mut rsp = vec![0u8; response_len as usize];
        read_response(&mut *stream, &mut rsp, self.config.response_timeout)?;
        trace!(len = rsp.len(), "bridge response");
        Ok(Bytes::from(rsp))
    }
}

impl CommandChannel<SerialStream> {
    /// Open the bridge on a serial port.
    ///
    /// Stale bytes left in the port's input buffer are discarded so the
    /// first response lines up with the first request.
    pub fn open(port: &str, serial: &SerialConfig, config: ChannelConfig) -> Result<Self> {
        let stream = SerialStream::open_with_config(port, serial)?;
        stream.discard_input()?;
        Ok(Self::with_config(stream, config))
    }
}
