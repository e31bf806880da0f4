use parley_shared::{RoomId, ValidationError};
use parley_store::StoreError;
use thiserror::Error;

/// Errors returned by client commands.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Input rejected by a form check; shown to the user as a notice.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Already signed in")]
    AlreadyAuthenticated,

    #[error("No OTP has been requested")]
    OtpNotRequested,

    #[error("No chatroom selected")]
    NoActiveRoom,

    #[error("Chatroom not found: {0}")]
    RoomNotFound(RoomId),

    #[error("The assistant is still responding in {0}")]
    AlreadyResponding(RoomId),

    #[error("No more messages in {0}")]
    HistoryExhausted(RoomId),

    #[error("Older messages are already loading for {0}")]
    HistoryLoadInFlight(RoomId),

    #[error("State lock poisoned")]
    LockPoisoned,
}

impl ClientError {
    /// Whether this error is a user-input problem rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
