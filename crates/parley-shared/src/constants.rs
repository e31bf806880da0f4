/// Application name
pub const APP_NAME: &str = "Parley";

/// Storage key holding the signed-in user record
pub const AUTH_KEY: &str = "gemini_auth";

/// Storage key holding the room list
pub const CHATROOMS_KEY: &str = "gemini_chatrooms";

/// Delay before a simulated assistant reply lands, in milliseconds
pub const RESPONSE_DELAY_MS: u64 = 2_500;

/// Artificial latency of one history page load, in milliseconds
pub const HISTORY_DELAY_MS: u64 = 1_000;

/// Simulated "sending OTP" latency, in milliseconds
pub const OTP_SEND_DELAY_MS: u64 = 1_000;

/// Simulated "verifying OTP" latency, in milliseconds
pub const OTP_VERIFY_DELAY_MS: u64 = 500;

/// Messages per synthesized history page
pub const HISTORY_PAGE_SIZE: usize = 20;

/// History pages available per room before the end is reached
pub const HISTORY_MAX_PAGES: u32 = 5;

/// Spacing between synthesized history messages, in seconds
pub const HISTORY_SPACING_SECS: i64 = 60;

/// Required OTP length
pub const OTP_LENGTH: usize = 6;

/// Phone number length bounds
pub const PHONE_MIN_LEN: usize = 6;
pub const PHONE_MAX_LEN: usize = 15;

/// Maximum attached image size in bytes (5 MiB)
pub const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Public country directory consulted on the login screen
pub const COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";

/// Timeout for the country directory request, in seconds
pub const COUNTRIES_TIMEOUT_SECS: u64 = 5;
