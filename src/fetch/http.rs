use super::ImageFetcher;
use crate::{MapError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Shared async HTTP client for icon fetching
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("fairmap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .expect("failed to build reqwest async client")
});

/// Fetches remote icons over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    request_timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = HTTP_CLIENT
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MapError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let data = response.bytes().await?.to_vec();
        log::debug!("downloaded icon {} ({} bytes)", url, data.len());
        Ok(data)
    }
}
