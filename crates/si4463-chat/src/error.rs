use std::fmt;
use std::time::Duration;

/// The two parties sharing the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Sender,
    Receiver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => f.write_str("sender"),
            Role::Receiver => f.write_str("receiver"),
        }
    }
}

/// Errors raised while handing the link between roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// The peer did not hand the link over in time.
    #[error("turn handoff timed out after {0:?}")]
    CoordinationTimeout(Duration),

    /// The peer's handle was dropped; it will never hand the link over.
    #[error("{0} is gone")]
    PeerGone(Role),
}

/// Errors that can occur while chatting.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Chip operation failed.
    #[error("driver error: {0}")]
    Driver(#[from] si4463_driver::DriverError),

    /// Turn coordination failed.
    #[error("turn error: {0}")]
    Turn(#[from] TurnError),

    /// Message does not fit in one packet.
    #[error("message is {len} bytes (max {max})")]
    MessageTooLong { len: usize, max: usize },

    /// A role's thread panicked.
    #[error("{0} thread panicked")]
    RoleFailed(Role),

    /// A role's thread could not be started.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl ChatError {
    /// True for errors that only follow from the other role shutting down.
    pub(crate) fn is_shutdown(&self) -> bool {
        matches!(
            self,
            ChatError::Turn(TurnError::PeerGone(_))
                | ChatError::Driver(si4463_driver::DriverError::Cancelled)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
