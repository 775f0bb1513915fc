//! HTTP-based page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::dom::Document;
use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::CrawlConfig;

/// Fetcher backed by its own `reqwest` client.
///
/// Each instance is an independent navigation session; the pipeline
/// builds one for listing pages and another for detail pages.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    poll_interval: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with a 30 second request timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: concat!("patroll-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            poll_interval: Duration::from_millis(500),
        }
    }

    /// Create a fetcher for one crawl session, carrying the config's
    /// user agent and poll cadence.
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new()
            .with_user_agent(config.user_agent.clone())
            .with_poll_interval(config.poll_interval())
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Set the interval between element-presence polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Document> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                FetchError::Request {
                    url: url.to_string(),
                    source: Box::new(e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Final URL after redirects becomes the base for relative links
        let final_url = response.url().to_string();

        let html = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        debug!(url = %url, bytes = html.len(), "HTTP fetch complete");
        Ok(Document::new(final_url, html))
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
