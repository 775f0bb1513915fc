//! Page fetching with bounded element waits.

use std::time::Duration;

use async_trait::async_trait;

use crate::dom::Document;
use crate::error::FetchResult;

/// Result of a bounded wait for an element.
///
/// Both outcomes carry the last document fetched: a timeout is not a
/// failure, merely a page that never showed the expected element. Callers
/// decide whether to proceed with the partial page or degrade.
#[derive(Debug)]
pub enum WaitOutcome {
    /// The selector matched within the timeout.
    Ready(Document),
    /// The deadline passed without a match.
    TimedOut(Document),
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready(_))
    }

    pub fn document(&self) -> &Document {
        match self {
            WaitOutcome::Ready(doc) | WaitOutcome::TimedOut(doc) => doc,
        }
    }

    pub fn into_document(self) -> Document {
        match self {
            WaitOutcome::Ready(doc) | WaitOutcome::TimedOut(doc) => doc,
        }
    }
}

/// A navigation session that can load pages.
///
/// The pipeline uses two independent sessions: one that only ever sees
/// listing pages and one for detail and results pages, so listing state
/// is never disturbed by detail navigation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load a URL and return the rendered document.
    async fn fetch(&self, url: &str) -> FetchResult<Document>;

    /// Interval between element-presence polls in [`fetch_until`].
    ///
    /// [`fetch_until`]: PageFetcher::fetch_until
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(500)
    }

    /// Load a URL and wait up to `timeout` for `selector` to match.
    ///
    /// Polls by refetching; returns [`WaitOutcome::TimedOut`] with the
    /// last document when the deadline passes. Fetch errors propagate.
    async fn fetch_until(
        &self,
        url: &str,
        selector: &str,
        timeout: Duration,
    ) -> FetchResult<WaitOutcome> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let doc = self.fetch(url).await?;
            if doc.has_selector(selector) {
                return Ok(WaitOutcome::Ready(doc));
            }
            if tokio::time::Instant::now() + self.poll_interval() >= deadline {
                return Ok(WaitOutcome::TimedOut(doc));
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }
}
