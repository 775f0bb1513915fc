//! Listing-page traversal.
//!
//! [`ContestListing`] walks a category listing page by page, yielding the
//! contest links each page advertises. Termination is part of the design,
//! not an error path: the walk ends at the page cap, when the listing
//! container disappears, or when the pagination control runs out.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::dom::Document;
use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::CrawlConfig;
use crate::types::contest::Category;

/// Selector for the listing container holding contest cards.
pub const LISTING_CONTAINER: &str = "ul.ant-list-items";

/// Href prefix of patent-reference links.
pub const PATENT_REFERENCE_PREFIX: &str = "https://www.google.com";

/// Relative href prefix of contest detail links.
const CONTEST_PATH: &str = "/contests/";

/// Selector for the dedicated next-page affordance.
const NEXT_CONTROL: &str = "li.ant-pagination-next[title=\"Next Page\"]";

/// Selector matching the next-page affordance once the site disables it.
const NEXT_CONTROL_DISABLED: &str = "li.ant-pagination-next[aria-disabled=\"true\"]";

/// One contest link discovered on a listing page.
///
/// The `won` listing shows each contest's challenged patent as a
/// patent-reference link beside the card, so the id rides along here;
/// the `finished` listing does not, and the extractor reads it from the
/// detail page instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub detail_url: String,
    pub troll_patent_id: Option<String>,
}

/// One visited listing page and the entries it yielded.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub number: usize,
    pub entries: Vec<ListingEntry>,
}

/// Lazy walk over the listing pages of one category.
///
/// Not restartable mid-sequence; build a fresh value to start over from
/// page 1.
pub struct ContestListing<'a, F: PageFetcher> {
    fetcher: &'a F,
    config: &'a CrawlConfig,
    page: usize,
    done: bool,
}

impl<'a, F: PageFetcher> ContestListing<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a CrawlConfig) -> Self {
        Self {
            fetcher,
            config,
            page: 1,
            done: false,
        }
    }

    /// Fetch and parse the next listing page.
    ///
    /// `Ok(None)` is the designed end of the walk. The only error is the
    /// first listing page being unreachable; later fetch failures end
    /// the walk with a warning.
    pub async fn next_page(&mut self) -> CrawlResult<Option<ListingPage>> {
        if self.done || self.page > self.config.max_pages {
            return Ok(None);
        }

        if self.page > 1 && self.config.rate_limit_ms > 0 {
            tokio::time::sleep(self.config.rate_limit()).await;
        }

        let url = self.config.page_url(self.page);
        let outcome = match self
            .fetcher
            .fetch_until(&url, LISTING_CONTAINER, self.config.element_timeout())
            .await
        {
            Ok(outcome) => outcome,
            Err(err) if self.page == 1 => {
                return Err(CrawlError::ListingUnreachable { url, source: err });
            }
            Err(err) => {
                warn!(url = %url, error = %err, "listing page fetch failed, stopping");
                self.done = true;
                return Ok(None);
            }
        };

        if !outcome.is_ready() {
            debug!(url = %url, "listing container did not render in time");
        }
        let doc = outcome.into_document();

        let Some(entries) = parse_entries(&doc, self.config) else {
            info!(page = self.page, "listing container absent, end of data");
            self.done = true;
            return Ok(None);
        };

        debug!(page = self.page, entries = entries.len(), "listing page parsed");
        let page = ListingPage {
            number: self.page,
            entries,
        };

        if !has_next_control(&doc, self.page) {
            debug!(page = self.page, "no next-page control, final page");
            self.done = true;
        }
        self.page += 1;

        Ok(Some(page))
    }
}

/// Collect contest entries from a listing document.
///
/// Returns `None` when the listing container is absent. Contest links
/// are deduplicated within the page preserving first-seen order, and in
/// the `won` flow each patent-reference link is paired with the contest
/// card it follows.
fn parse_entries(doc: &Document, config: &CrawlConfig) -> Option<Vec<ListingEntry>> {
    if !doc.has_selector(LISTING_CONTAINER) {
        return None;
    }

    let contest_prefix = format!("{}{}", config.base_url.trim_end_matches('/'), CONTEST_PATH);
    let correlate_trolls = config.category == Category::Won;

    let mut seen: HashSet<String> = HashSet::new();
    let mut entries: Vec<ListingEntry> = Vec::new();

    for link in doc.links(&format!("{LISTING_CONTAINER} a")) {
        if link.href.starts_with(&contest_prefix) {
            if seen.insert(link.href.clone()) {
                entries.push(ListingEntry {
                    detail_url: link.href,
                    troll_patent_id: None,
                });
            }
        } else if correlate_trolls && link.href.starts_with(PATENT_REFERENCE_PREFIX) {
            if let Some(entry) = entries.last_mut() {
                if entry.troll_patent_id.is_none() {
                    entry.troll_patent_id = last_path_segment(&link.href);
                }
            }
        }
    }

    Some(entries)
}

/// Whether the page advertises a way to reach the next one: either the
/// ordinal control for `current + 1` or an enabled next affordance.
fn has_next_control(doc: &Document, current: usize) -> bool {
    let ordinal = format!("li[title=\"{}\"]", current + 1);
    if doc.has_selector(&ordinal) {
        return true;
    }
    doc.has_selector(NEXT_CONTROL) && !doc.has_selector(NEXT_CONTROL_DISABLED)
}

fn last_path_segment(href: &str) -> Option<String> {
    href.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::testing::ListingFixture;

    fn won_config(base: &str) -> CrawlConfig {
        CrawlConfig::new(Category::Won)
            .with_base_url(base)
            .with_rate_limit_ms(0)
            .with_element_timeout_ms(0)
    }

    #[test]
    fn test_entries_dedupe_and_keep_order() {
        let html = ListingFixture::new()
            .card("/contests/one", "First")
            .card("/contests/two", "Second")
            .card("/contests/one", "First again")
            .build();
        let doc = Document::new("https://example.com/contests?category=won", html);
        let config = won_config("https://example.com");

        let entries = parse_entries(&doc, &config).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].detail_url, "https://example.com/contests/one");
        assert_eq!(entries[1].detail_url, "https://example.com/contests/two");
    }

    #[test]
    fn test_won_flow_pairs_troll_ids_with_cards() {
        let html = ListingFixture::new()
            .card_with_troll(
                "/contests/one",
                "First",
                "https://www.google.com/patents/US1111111",
            )
            .card("/contests/two", "Second")
            .card_with_troll(
                "/contests/three",
                "Third",
                "https://www.google.com/patents/US3333333",
            )
            .build();
        let doc = Document::new("https://example.com/contests?category=won", html);
        let config = won_config("https://example.com");

        let entries = parse_entries(&doc, &config).unwrap();
        assert_eq!(entries[0].troll_patent_id.as_deref(), Some("US1111111"));
        assert_eq!(entries[1].troll_patent_id, None);
        assert_eq!(entries[2].troll_patent_id.as_deref(), Some("US3333333"));
    }

    #[test]
    fn test_finished_flow_leaves_troll_ids_to_the_detail_page() {
        let html = ListingFixture::new()
            .card_with_troll(
                "/contests/one",
                "First",
                "https://www.google.com/patents/US1111111",
            )
            .build();
        let doc = Document::new("https://example.com/contests?category=finished", html);
        let config = CrawlConfig::new(Category::Finished).with_base_url("https://example.com");

        let entries = parse_entries(&doc, &config).unwrap();
        assert_eq!(entries[0].troll_patent_id, None);
    }

    #[test]
    fn test_missing_container_means_end_of_data() {
        let doc = Document::new(
            "https://example.com/contests?category=won",
            ListingFixture::without_container().build(),
        );
        assert!(parse_entries(&doc, &won_config("https://example.com")).is_none());
    }

    #[test]
    fn test_next_control_detection() {
        let with_ordinal = Document::new(
            "https://example.com",
            ListingFixture::new().with_next_page(2).build(),
        );
        assert!(has_next_control(&with_ordinal, 1));

        let disabled = Document::new("https://example.com", ListingFixture::new().build());
        assert!(!has_next_control(&disabled, 1));

        let no_pagination = Document::new(
            "https://example.com",
            ListingFixture::new().without_pagination().build(),
        );
        assert!(!has_next_control(&no_pagination, 1));
    }

    #[tokio::test]
    async fn test_walk_stops_when_pagination_runs_out() {
        let base = "https://example.com";
        let config = won_config(base);
        let mock = MockFetcher::new()
            .with_page(
                config.page_url(1),
                ListingFixture::new()
                    .card("/contests/a", "A")
                    .with_next_page(2)
                    .build(),
            )
            .with_page(
                config.page_url(2),
                ListingFixture::new()
                    .card("/contests/b", "B")
                    .with_next_page(3)
                    .build(),
            )
            .with_page(
                config.page_url(3),
                ListingFixture::new().card("/contests/c", "C").build(),
            );

        let mut listing = ContestListing::new(&mock, &config);
        let mut pages = Vec::new();
        while let Some(page) = listing.next_page().await.unwrap() {
            pages.push(page);
        }

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].entries[0].detail_url, "https://example.com/contests/c");
        // Walk is exhausted, further calls keep returning None
        assert!(listing.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_walk_honors_page_cap() {
        let base = "https://example.com";
        let config = won_config(base).with_max_pages(2);
        let mock = MockFetcher::new()
            .with_page(
                config.page_url(1),
                ListingFixture::new()
                    .card("/contests/a", "A")
                    .with_next_page(2)
                    .build(),
            )
            .with_page(
                config.page_url(2),
                ListingFixture::new()
                    .card("/contests/b", "B")
                    .with_next_page(3)
                    .build(),
            );

        let mut listing = ContestListing::new(&mock, &config);
        let mut count = 0;
        while let Some(_page) = listing.next_page().await.unwrap() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_unreachable_first_page_is_fatal() {
        let config = won_config("https://example.com");
        let mock = MockFetcher::new();

        let mut listing = ContestListing::new(&mock, &config);
        let err = listing.next_page().await.unwrap_err();
        assert!(matches!(err, CrawlError::ListingUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_later_fetch_failure_ends_the_walk() {
        let config = won_config("https://example.com");
        let mock = MockFetcher::new().with_page(
            config.page_url(1),
            ListingFixture::new()
                .card("/contests/a", "A")
                .with_next_page(2)
                .build(),
        );

        let mut listing = ContestListing::new(&mock, &config);
        assert!(listing.next_page().await.unwrap().is_some());
        // Page 2 is canned as a 404; the walk ends instead of failing
        assert!(listing.next_page().await.unwrap().is_none());
    }
}
