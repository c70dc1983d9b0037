//! Request framing and the serialized command channel for the Si4463 bridge.
//!
//! Every request is framed with:
//! - A 1-byte payload length
//! - A 1-byte expected response length
//!
//! The bridge answers with exactly the expected number of bytes, or with a
//! single sync byte when no response payload was asked for. There is no
//! response header.

pub mod channel;
pub mod codec;
pub mod error;
mod reader;
mod writer;

pub use channel::{ChannelConfig, CommandChannel};
pub use codec::{
    decode_request, encode_items, encode_request, int_to_byte, Item, WireRequest, HEADER_SIZE,
    MAX_REQUEST_LEN,
};
pub use error::{ChannelError, EncodingError, Result};
