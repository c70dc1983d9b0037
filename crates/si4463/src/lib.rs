//! Si4463 sub-GHz radio driven through a serial command bridge.
//!
//! The bridge is a small microcontroller that forwards length-prefixed
//! command buffers to the radio and sends back its responses. On top of
//! that sits a typed chip driver and a half-duplex chat that shares one
//! radio between a sending and a receiving thread.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port access to the bridge
//! - [`frame`]: request framing and the serialized command channel
//! - [`driver`]: typed chip operations, status polling, `radio_config.h` loading
//! - [`chat`]: turn coordination and the chat loop (behind `chat` feature)

/// Re-export transport types.
pub mod transport {
    pub use si4463_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use si4463_frame::*;
}

/// Re-export driver types.
pub mod driver {
    pub use si4463_driver::*;
}

/// Re-export chat types (requires `chat` feature).
#[cfg(feature = "chat")]
pub mod chat {
    pub use si4463_chat::*;
}
