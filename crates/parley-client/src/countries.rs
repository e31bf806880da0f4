//! Country directory lookup for the phone form.
//!
//! The public directory is tried first; any failure (network, status,
//! payload, or an empty usable list) falls back to the bundled list.  The
//! caller always gets a sorted, non-empty set of options.

use std::time::Duration;

use parley_shared::countries::{self, Country, DialOption};
use tracing::{debug, warn};

async fn fetch_countries(url: &str, timeout: Duration) -> Result<Vec<Country>, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Country>>()
        .await
}

/// Dial options from `url`, or the bundled fallback.
pub async fn dial_options(url: &str, timeout: Duration) -> Vec<DialOption> {
    match fetch_countries(url, timeout).await {
        Ok(list) => {
            let options = countries::dial_options(&list);
            if !options.is_empty() {
                debug!(count = options.len(), "loaded country directory");
                return options;
            }
            warn!(url, "country directory returned no dial codes, using fallback");
        }
        Err(e) => {
            warn!(url, error = %e, "country directory unavailable, using fallback");
        }
    }
    countries::dial_options(&countries::fallback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_directory_uses_fallback() {
        // Nothing listens on the local discard port.
        let options = dial_options("http://127.0.0.1:9/all", Duration::from_millis(500)).await;
        assert_eq!(options.len(), 10);
        assert_eq!(options[0].name, "Australia");
    }

    #[tokio::test]
    async fn test_malformed_url_uses_fallback() {
        let options = dial_options("not a url", Duration::from_millis(100)).await;
        assert_eq!(options.len(), 10);
    }
}
