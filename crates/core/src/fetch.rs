//! Image retrieval.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// Default bound on a single image request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// User-Agent sent with image requests.
pub const DEFAULT_USER_AGENT: &str = concat!("deck-render/", env!("CARGO_PKG_VERSION"));

/// Source of image bytes for picture shapes.
pub trait ImageFetcher {
    /// Retrieve the bytes behind `url`. Implementations make one attempt and
    /// never retry.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches images over HTTP(S) with a bounded, single attempt.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a fetcher with a custom timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let failed = |reason: String| Error::ImageFetch {
            url: url.to_string(),
            reason,
        };

        log::debug!("Fetching image {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(e.to_string()))?;

        let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
