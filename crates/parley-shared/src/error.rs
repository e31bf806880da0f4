use thiserror::Error;

/// Input rejected before it reaches the store.
///
/// These are shown to the user as transient notices, never treated as
/// failures of the application itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a chatroom title")]
    EmptyRoomTitle,

    #[error("Please select a country")]
    MissingCountryCode,

    #[error("Phone number must be at least {min} digits")]
    PhoneTooShort { min: usize },

    #[error("Phone number is too long (max {max} digits)")]
    PhoneTooLong { max: usize },

    #[error("OTP must be {expected} digits")]
    InvalidOtpLength { expected: usize },

    #[error("Message must contain text or an image")]
    EmptyMessage,

    #[error("Image size should be less than {max} bytes (got {size})")]
    ImageTooLarge { size: u64, max: u64 },

    #[error("Unsupported image type: {extension}")]
    UnsupportedImageType { extension: String },
}
