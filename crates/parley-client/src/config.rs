//! Client configuration loaded from environment variables.
//!
//! All settings have defaults, so the client starts with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use parley_shared::constants::{
    COUNTRIES_TIMEOUT_SECS, COUNTRIES_URL, HISTORY_DELAY_MS, OTP_SEND_DELAY_MS,
    OTP_VERIFY_DELAY_MS, RESPONSE_DELAY_MS,
};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory holding `parley.db`.
    /// Env: `PARLEY_DATA_DIR`
    /// Default: platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Keep all state in memory and write nothing to disk.
    /// Env: `PARLEY_IN_MEMORY` (true/false)
    /// Default: `false`
    pub in_memory: bool,

    /// Delay before the simulated assistant reply.
    /// Env: `PARLEY_RESPONSE_DELAY_MS`
    /// Default: 2500 ms
    pub response_delay: Duration,

    /// Latency of one older-history page.
    /// Env: `PARLEY_HISTORY_DELAY_MS`
    /// Default: 1000 ms
    pub history_delay: Duration,

    /// Simulated OTP send latency.
    /// Env: `PARLEY_OTP_DELAY_MS`
    /// Default: 1000 ms
    pub otp_send_delay: Duration,

    /// Simulated OTP verification latency. Not configurable.
    pub otp_verify_delay: Duration,

    /// Country directory endpoint.
    /// Env: `PARLEY_COUNTRIES_URL`
    /// Default: `https://restcountries.com/v3.1/all`
    pub countries_url: String,

    /// Timeout for the country directory request.
    pub countries_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            in_memory: false,
            response_delay: Duration::from_millis(RESPONSE_DELAY_MS),
            history_delay: Duration::from_millis(HISTORY_DELAY_MS),
            otp_send_delay: Duration::from_millis(OTP_SEND_DELAY_MS),
            otp_verify_delay: Duration::from_millis(OTP_VERIFY_DELAY_MS),
            countries_url: COUNTRIES_URL.to_string(),
            countries_timeout: Duration::from_secs(COUNTRIES_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("PARLEY_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = lookup("PARLEY_IN_MEMORY") {
            config.in_memory = val == "true" || val == "1";
        }

        if let Some(d) = parse_millis(&lookup, "PARLEY_RESPONSE_DELAY_MS") {
            config.response_delay = d;
        }

        if let Some(d) = parse_millis(&lookup, "PARLEY_HISTORY_DELAY_MS") {
            config.history_delay = d;
        }

        if let Some(d) = parse_millis(&lookup, "PARLEY_OTP_DELAY_MS") {
            config.otp_send_delay = d;
        }

        if let Some(url) = lookup("PARLEY_COUNTRIES_URL") {
            if !url.is_empty() {
                config.countries_url = url;
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid duration, using default");
            None
        }
    }
}
