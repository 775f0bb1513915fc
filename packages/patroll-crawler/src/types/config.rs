//! Crawl configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::contest::Category;

/// Default site crawled when no base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://patroll.unifiedpatents.com";

/// Default listing-page cap; the live site has never exceeded this.
pub const DEFAULT_MAX_PAGES: usize = 19;

/// Configuration for one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Site root without a trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Listing category to crawl.
    pub category: Category,

    /// Upper bound on listing pages visited. Default: 19.
    ///
    /// The crawl usually stops earlier, when the pagination control
    /// runs out.
    pub max_pages: usize,

    /// Bounded wait for an expected element to render, in ms.
    ///
    /// Default: 10 000.
    pub element_timeout_ms: u64,

    /// Interval between element-presence polls for fetchers built from
    /// this config, in ms. Default: 500.
    pub poll_interval_ms: u64,

    /// Politeness pause between consecutive fetches, in ms. Default: 1000.
    pub rate_limit_ms: u64,

    /// User-Agent header for fetchers built from this config.
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            category: Category::Won,
            max_pages: DEFAULT_MAX_PAGES,
            element_timeout_ms: 10_000,
            poll_interval_ms: 500,
            rate_limit_ms: 1_000,
            user_agent: concat!("patroll-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CrawlConfig {
    /// Create a config for a category with default limits.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }

    /// Set the site root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the listing-page cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the element wait timeout in milliseconds.
    pub fn with_element_timeout_ms(mut self, ms: u64) -> Self {
        self.element_timeout_ms = ms;
        self
    }

    /// Set the poll interval in milliseconds.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the politeness pause in milliseconds.
    pub fn with_rate_limit_ms(mut self, ms: u64) -> Self {
        self.rate_limit_ms = ms;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Listing URL for page 1 of the configured category.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/contests?category={}",
            self.base_url.trim_end_matches('/'),
            self.category
        )
    }

    /// Listing URL for an arbitrary 1-based page number.
    pub fn page_url(&self, page: usize) -> String {
        if page <= 1 {
            self.listing_url()
        } else {
            format!("{}&page={}", self.listing_url(), page)
        }
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}
