use std::borrow::Cow;
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use si4463_driver::{interrupt, CancelToken, PollOptions, RxOptions, Si4463, TxOptions};
use tracing::{debug, info, warn};

use crate::error::{ChatError, Result, Role};
use crate::packet::{decode_packet, encode_packet, MAX_PACKET_LEN};
use crate::turn::{ReceiverTurn, SenderTurn, TurnConfig, TurnCoordinator};

/// Name given to the sender's thread.
pub const SENDER_THREAD_NAME: &str = "si4463-sender";

/// Settings shared by both chat roles.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Radio channel for both transmit and receive.
    pub channel: u8,
    /// Receive length passed to `START_RX` and read back from the RX FIFO.
    pub rx_len: u16,
    /// Limits for the sender's packet-sent poll.
    pub poll: PollOptions,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            rx_len: MAX_PACKET_LEN as u16,
            poll: PollOptions::default(),
        }
    }
}

impl ChatConfig {
    /// RX FIFO read length. The FIFO read command carries a one-byte length.
    fn read_len(&self) -> u8 {
        u8::try_from(self.rx_len).unwrap_or(u8::MAX)
    }
}

/// A message taken off the air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message bytes, without the length header.
    pub payload: Bytes,
}

impl ChatMessage {
    pub(crate) fn from_fifo(data: &Bytes) -> Self {
        // The message starts right after the length byte.
        let len = decode_packet(data).len();
        let start = usize::from(!data.is_empty());
        Self {
            payload: data.slice(start..start + len),
        }
    }

    /// The message as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Send each message in turn, claiming the link for every one.
///
/// Messages longer than one packet are truncated. Returns once the
/// messages run out.
pub fn run_sender<T, I>(
    chip: &Si4463<T>,
    turn: &mut SenderTurn,
    messages: I,
    config: &ChatConfig,
) -> Result<()>
where
    T: Read + Write,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for message in messages {
        let packet = encode_packet(message.as_ref().as_bytes());
        let len = packet.len() - 1;

        let guard = turn.claim()?;
        chip.clear_packet_sent_flag()?;
        chip.clear_tx_fifo()?;
        chip.write_tx_fifo(&packet)?;
        chip.start_transmit(&TxOptions {
            channel: config.channel,
            length: packet.len() as u16,
            ..TxOptions::default()
        })?;
        chip.poll_until_packet_sent(&config.poll)?;
        guard.release();

        info!(len, "sent");
    }
    debug!("sender out of messages");
    Ok(())
}

/// Listen for packets until cancelled, yielding the link whenever the
/// sender asks for it.
pub fn run_receiver<T, F>(
    chip: &Si4463<T>,
    turn: &mut ReceiverTurn,
    config: &ChatConfig,
    cancel: &CancelToken,
    mut on_message: F,
) -> Result<()>
where
    T: Read + Write,
    F: FnMut(ChatMessage),
{
    let rx = RxOptions {
        channel: config.channel,
        length: config.rx_len,
        ..RxOptions::default()
    };

    'listen: loop {
        if cancel.is_cancelled() {
            break;
        }
        chip.clear_packet_received_flag()?;
        chip.clear_rx_fifo()?;
        chip.start_receive(&rx)?;

        loop {
            if cancel.is_cancelled() {
                break 'listen;
            }
            if turn.should_yield() {
                turn.yield_turn()?;
                continue 'listen;
            }
            let status = chip.packet_header_status()?;
            if status & interrupt::PACKET_RX != 0 {
                break;
            }
        }

        let data = chip.read_rx_fifo(config.read_len())?;
        let message = ChatMessage::from_fifo(&data);
        info!(len = message.payload.len(), text = %message.text(), "received");
        on_message(message);
    }
    debug!("receiver cancelled");
    Ok(())
}

/// Both chat roles over one shared radio.
pub struct ChatSession<T> {
    chip: Arc<Si4463<T>>,
    config: ChatConfig,
    turn: TurnConfig,
}

impl<T> ChatSession<T>
where
    T: Read + Write + Send + 'static,
{
    pub fn new(chip: Arc<Si4463<T>>, config: ChatConfig, turn: TurnConfig) -> Self {
        Self { chip, config, turn }
    }

    /// Run the sender on its own thread and the receiver on this one.
    ///
    /// Returns when `cancel` is tripped or either role fails. A sender
    /// failure cancels the receiver; a receiver failure releases the sender.
    /// The first real failure is reported. The sender's message source
    /// should end or stop blocking once `cancel` is tripped, since the
    /// sender thread is joined before returning.
    pub fn run<I, F>(&self, messages: I, on_message: F, cancel: &CancelToken) -> Result<()>
    where
        I: IntoIterator + Send + 'static,
        I::Item: AsRef<str>,
        F: FnMut(ChatMessage),
    {
        let (mut sender_turn, mut receiver_turn) = TurnCoordinator::new(self.turn.clone()).split();

        let mut sender_config = self.config.clone();
        if sender_config.poll.cancel.is_none() {
            sender_config.poll.cancel = Some(cancel.clone());
        }

        let chip = Arc::clone(&self.chip);
        let sender_cancel = cancel.clone();
        let sender = thread::Builder::new()
            .name(SENDER_THREAD_NAME.to_string())
            .spawn(move || {
                let result = run_sender(&chip, &mut sender_turn, messages, &sender_config);
                if let Err(err) = &result {
                    if !err.is_shutdown() {
                        warn!(error = %err, "sender failed");
                        sender_cancel.cancel();
                    }
                }
                result
            })?;

        info!(channel = self.config.channel, "chat started");
        let received = run_receiver(
            &self.chip,
            &mut receiver_turn,
            &self.config,
            cancel,
            on_message,
        );
        if let Err(err) = &received {
            if !err.is_shutdown() {
                warn!(error = %err, "receiver failed");
            }
            cancel.cancel();
        }
        // Releases a sender still waiting for the link.
        drop(receiver_turn);

        let sent = sender
            .join()
            .unwrap_or(Err(ChatError::RoleFailed(Role::Sender)));
        info!("chat stopped");

        first_failure(sent, received)
    }
}

/// The failure that ended the session. A role that only saw the other one
/// going away did not fail; the sender's own error wins over the receiver's.
fn first_failure(sent: Result<()>, received: Result<()>) -> Result<()> {
    match (sent, received) {
        (Err(err), _) if !err.is_shutdown() => Err(err),
        (_, Err(err)) if !err.is_shutdown() => Err(err),
        _ => Ok(()),
    }
}
