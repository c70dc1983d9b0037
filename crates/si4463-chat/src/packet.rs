//! RF packet layout: one length byte followed by the message.

use bytes::{BufMut, Bytes, BytesMut};

/// Longest message that fits in one packet.
pub const MAX_MESSAGE_LEN: usize = 63;

/// Largest packet on air (length byte plus message).
pub const MAX_PACKET_LEN: usize = MAX_MESSAGE_LEN + 1;

/// Build a packet, silently truncating the message to [`MAX_MESSAGE_LEN`].
pub fn encode_packet(message: &[u8]) -> Bytes {
    let body = &message[..message.len().min(MAX_MESSAGE_LEN)];
    let mut out = BytesMut::with_capacity(body.len() + 1);
    out.put_u8(body.len() as u8);
    out.put_slice(body);
    out.freeze()
}

/// Extract the message from raw FIFO bytes.
///
/// The length byte is clamped to the bytes actually present, so a corrupt
/// header never reads past the buffer.
pub fn decode_packet(data: &[u8]) -> &[u8] {
    let Some((&len, rest)) = data.split_first() else {
        return &[];
    };
    &rest[..(len as usize).min(rest.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message() {
        assert_eq!(encode_packet(b"hi").as_ref(), &[0x02, 0x68, 0x69]);
    }

    #[test]
    fn boundary_lengths() {
        let exact = [b'a'; 63];
        let packet = encode_packet(&exact);
        assert_eq!(packet.len(), 64);
        assert_eq!(packet[0], 63);

        let over = [b'b'; 64];
        let packet = encode_packet(&over);
        assert_eq!(packet.len(), MAX_PACKET_LEN);
        assert_eq!(packet[0], 63);
        assert_eq!(&packet[1..], &over[..63]);
    }

    #[test]
    fn empty_message_is_a_bare_length_byte() {
        assert_eq!(encode_packet(b"").as_ref(), &[0x00]);
        assert_eq!(decode_packet(&[0x00, 0xAA]), b"");
    }

    #[test]
    fn decode_ignores_padding() {
        let mut fifo = vec![0u8; 64];
        fifo[..3].copy_from_slice(&[0x02, 0x68, 0x69]);
        assert_eq!(decode_packet(&fifo), b"hi");
    }

    #[test]
    fn decode_clamps_bad_length() {
        assert_eq!(decode_packet(&[0xFF, 0x41, 0x42]), b"AB");
        assert_eq!(decode_packet(&[]), b"");
    }
}
