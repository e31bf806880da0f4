//! Form checks for the login screen and the room/message inputs.

use crate::constants::{OTP_LENGTH, PHONE_MAX_LEN, PHONE_MIN_LEN};
use crate::error::ValidationError;

/// Trimmed room title, or an error if nothing is left.
pub fn room_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyRoomTitle);
    }
    Ok(title.to_string())
}

pub fn phone(country_code: &str, phone_number: &str) -> Result<(), ValidationError> {
    if country_code.trim().is_empty() {
        return Err(ValidationError::MissingCountryCode);
    }
    let len = phone_number.trim().chars().count();
    if len < PHONE_MIN_LEN {
        return Err(ValidationError::PhoneTooShort { min: PHONE_MIN_LEN });
    }
    if len > PHONE_MAX_LEN {
        return Err(ValidationError::PhoneTooLong { max: PHONE_MAX_LEN });
    }
    Ok(())
}

/// Any code of the right length is accepted; there is no real verifier.
pub fn otp(code: &str) -> Result<(), ValidationError> {
    if code.trim().chars().count() != OTP_LENGTH {
        return Err(ValidationError::InvalidOtpLength { expected: OTP_LENGTH });
    }
    Ok(())
}

/// A message needs visible text or an attached image.
pub fn message(content: &str, has_image: bool) -> Result<(), ValidationError> {
    if content.trim().is_empty() && !has_image {
        return Err(ValidationError::EmptyMessage);
    }
    Ok(())
}
