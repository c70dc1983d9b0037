//! Single-message send and receive, without turn coordination.

use std::io::{Read, Write};

use si4463_driver::{PollOptions, RxOptions, Si4463, TxOptions};
use tracing::info;

use crate::error::{ChatError, Result};
use crate::packet::{encode_packet, MAX_MESSAGE_LEN};
use crate::session::ChatMessage;

/// Transmit one message and wait until the chip reports it sent.
///
/// Unlike the chat sender, this refuses messages that do not fit in one
/// packet instead of truncating them.
pub fn send_message<T: Read + Write>(
    chip: &Si4463<T>,
    message: &[u8],
    channel: u8,
    poll: &PollOptions,
) -> Result<()> {
    if message.len() > MAX_MESSAGE_LEN {
        return Err(ChatError::MessageTooLong {
            len: message.len(),
            max: MAX_MESSAGE_LEN,
        });
    }
    let packet = encode_packet(message);

    chip.clear_interrupts()?;
    chip.clear_tx_fifo()?;
    chip.write_tx_fifo(&packet)?;
    chip.start_transmit(&TxOptions {
        channel,
        length: packet.len() as u16,
        ..TxOptions::default()
    })?;
    chip.poll_until_packet_sent(poll)?;

    info!(len = message.len(), channel, "sent");
    Ok(())
}

/// Arm the receiver and wait for one packet.
pub fn receive_message<T: Read + Write>(
    chip: &Si4463<T>,
    channel: u8,
    rx_len: u8,
    poll: &PollOptions,
) -> Result<ChatMessage> {
    chip.clear_interrupts()?;
    chip.clear_rx_fifo()?;
    chip.start_receive(&RxOptions {
        channel,
        length: u16::from(rx_len),
        ..RxOptions::default()
    })?;
    chip.poll_until_packet_received(poll)?;

    let data = chip.read_rx_fifo(rx_len)?;
    let message = ChatMessage::from_fifo(&data);
    info!(len = message.payload.len(), channel, "received");
    Ok(message)
}
