//! Half-duplex chat over one Si4463 radio.
//!
//! A sender and a receiver share the chip from separate threads. The
//! receiver keeps the radio listening and hands it over whenever the
//! sender has a message to transmit; see [`turn`] for the handoff rules.
//! On air each message is one packet: a length byte followed by up to
//! [`MAX_MESSAGE_LEN`] bytes.

pub mod error;
pub mod oneshot;
pub mod packet;
pub mod session;
pub mod turn;

pub use error::{ChatError, Result, Role, TurnError};
pub use oneshot::{receive_message, send_message};
pub use packet::{decode_packet, encode_packet, MAX_MESSAGE_LEN, MAX_PACKET_LEN};
pub use session::{
    run_receiver, run_sender, ChatConfig, ChatMessage, ChatSession, SENDER_THREAD_NAME,
};
pub use turn::{ReceiverTurn, SenderTurn, TurnConfig, TurnCoordinator, TurnGuard};
