use bytes::{BufMut, BytesMut};

use crate::error::EncodingError;

/// Request header: request length (1) + expected response length (1).
pub const HEADER_SIZE: usize = 2;

/// Largest payload the one-byte length header can describe.
pub const MAX_REQUEST_LEN: usize = u8::MAX as usize;

/// One byte-encodable piece of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    /// A raw byte.
    Byte(u8),
    /// An integer truncated to one byte. Values in -128..=-1 map to
    /// 128..=255 by two's complement; anything outside -128..=255 is rejected.
    Int(i32),
    /// A big-endian 16-bit field.
    U16Be(u16),
    /// A raw byte sequence, copied verbatim.
    Bytes(&'a [u8]),
}

impl Item<'_> {
    fn encoded_len(&self) -> usize {
        match self {
            Item::Byte(_) | Item::Int(_) => 1,
            Item::U16Be(_) => 2,
            Item::Bytes(bytes) => bytes.len(),
        }
    }
}

impl From<u8> for Item<'_> {
    fn from(value: u8) -> Self {
        Item::Byte(value)
    }
}

impl From<i8> for Item<'_> {
    fn from(value: i8) -> Self {
        Item::Byte(value as u8)
    }
}

impl<'a> From<&'a [u8]> for Item<'a> {
    fn from(value: &'a [u8]) -> Self {
        Item::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Item<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Item::Bytes(value)
    }
}

/// Truncate an integer to one byte the way the bridge protocol expects.
pub fn int_to_byte(value: i32) -> Result<u8, EncodingError> {
    match value {
        -128..=-1 => Ok((value & 0xFF) as u8),
        0..=255 => Ok(value as u8),
        _ => Err(EncodingError::IntOutOfRange(value)),
    }
}

/// Concatenate items into `dst` in argument order.
///
/// Returns the number of bytes appended. Fails if the result would be
/// empty or longer than [`MAX_REQUEST_LEN`]; `dst` is left untouched then.
pub fn encode_items(items: &[Item<'_>], dst: &mut BytesMut) -> Result<usize, EncodingError> {
    let mut len = 0usize;
    for item in items {
        if let Item::Int(value) = item {
            int_to_byte(*value)?;
        }
        len += item.encoded_len();
    }

    if len == 0 {
        return Err(EncodingError::Empty);
    }
    if len > MAX_REQUEST_LEN {
        return Err(EncodingError::TooLong {
            len,
            max: MAX_REQUEST_LEN,
        });
    }

    dst.reserve(len);
    for item in items {
        match *item {
            Item::Byte(byte) => dst.put_u8(byte),
            Item::Int(value) => dst.put_u8(int_to_byte(value)?),
            Item::U16Be(value) => dst.put_u16(value),
            Item::Bytes(bytes) => dst.put_slice(bytes),
        }
    }
    Ok(len)
}

/// Encode a complete bridge request into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬──────────────────────┐
/// │ Req len (1B) │ Rsp len (1B) │ Payload (Req len B)  │
/// └──────────────┴──────────────┴──────────────────────┘
/// ```
pub fn encode_request(
    items: &[Item<'_>],
    response_len: u8,
    dst: &mut BytesMut,
) -> Result<(), EncodingError> {
    let mut payload = BytesMut::new();
    let len = encode_items(items, &mut payload)?;

    dst.reserve(HEADER_SIZE + len);
    dst.put_u8(len as u8);
    dst.put_u8(response_len);
    dst.put_slice(&payload);
    Ok(())
}

/// A request as seen from the bridge side of the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRequest<'a> {
    /// Number of response bytes the host expects (0 = one sync byte).
    pub response_len: u8,
    /// The request payload. Empty for bridge-local commands.
    pub payload: &'a [u8],
}

impl WireRequest<'_> {
    /// The command opcode, if this request is addressed to the chip.
    pub fn opcode(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Total bytes this request occupies on the wire.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Decode one request from the front of `src`.
///
/// Returns `None` if `src` does not hold a complete request yet.
pub fn decode_request(src: &[u8]) -> Option<WireRequest<'_>> {
    if src.len() < HEADER_SIZE {
        return None;
    }
    let request_len = src[0] as usize;
    let response_len = src[1];
    let payload = src.get(HEADER_SIZE..HEADER_SIZE + request_len)?;
    Some(WireRequest {
        response_len,
        payload,
    })
}
