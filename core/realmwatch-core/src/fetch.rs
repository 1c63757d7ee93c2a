//! Profile page fetch over HTTPS.

use std::time::Duration;

use crate::error::{Result, WatchError};

/// Outer bound on one page fetch, connect included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client identification sent with every request.
pub const USER_AGENT: &str = concat!("realmwatch/", env!("CARGO_PKG_VERSION"));

/// Source-page collaborator contract.
pub trait PageFetcher {
    /// Fetches a profile page and returns the response body.
    /// A non-2xx response is a fetch failure, not a body.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| WatchError::Client { source })?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| WatchError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| WatchError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}
