//! Mock fetcher for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::dom::Document;
use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{PageFetcher, WaitOutcome};

/// In-memory fetcher serving canned pages.
///
/// URLs without a canned page answer with HTTP 404, and `fetch_until`
/// resolves immediately instead of polling, so tests never sleep.
/// Clones share pages and the recorded call log.
///
/// # Example
///
/// ```rust
/// use patroll_crawler::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://example.com/", "<h1>Home</h1>");
/// ```
#[derive(Default)]
pub struct MockFetcher {
    /// Canned HTML indexed by URL
    pages: Arc<RwLock<HashMap<String, String>>>,
    /// Every URL passed to fetch, in call order
    fetch_calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned page.
    pub fn add_page(&self, url: impl Into<String>, html: impl Into<String>) {
        let mut pages = self.pages.write().unwrap();
        pages.insert(url.into(), html.into());
    }

    /// Add a canned page (builder pattern).
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.add_page(url, html);
        self
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.read().unwrap().len()
    }

    /// URLs fetched, in call order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.read().unwrap().clone()
    }

    /// Clear the recorded call log.
    pub fn reset_calls(&self) {
        self.fetch_calls.write().unwrap().clear();
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            fetch_calls: Arc::clone(&self.fetch_calls),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Document> {
        self.fetch_calls.write().unwrap().push(url.to_string());

        let pages = self.pages.read().unwrap();
        match pages.get(url) {
            Some(html) => Ok(Document::new(url, html.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::ZERO
    }

    // Canned pages never change between polls, so one fetch decides.
    async fn fetch_until(
        &self,
        url: &str,
        selector: &str,
        _timeout: Duration,
    ) -> FetchResult<WaitOutcome> {
        let doc = self.fetch(url).await?;
        if doc.has_selector(selector) {
            Ok(WaitOutcome::Ready(doc))
        } else {
            Ok(WaitOutcome::TimedOut(doc))
        }
    }
}
