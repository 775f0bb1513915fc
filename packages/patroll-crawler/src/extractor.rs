//! Per-contest extraction.
//!
//! [`ContestExtractor::extract`] never fails: every sub-extraction that
//! comes up empty degrades to the `"N/A"` sentinel or an empty list and
//! logs a warning, so the pipeline gets exactly one record per listing
//! entry no matter what the detail page looks like.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::dom::Document;
use crate::error::FetchResult;
use crate::navigator::{ListingEntry, PATENT_REFERENCE_PREFIX};
use crate::traits::fetcher::{PageFetcher, WaitOutcome};
use crate::types::config::CrawlConfig;
use crate::types::contest::{Category, ContestRecord, FinishedContest, WonContest, NOT_AVAILABLE};

/// Marker text introducing the link to the winning-prior-art page.
pub const DOWNLOAD_MARKER: &str = "DOWNLOAD WINNING PRIOR ART HERE";

/// Marker phrase preceding the submissions list on a results page.
pub const SUBMISSIONS_MARKER: &str = "Winning Submissions:";

/// Anchors inside the structured submissions list layout.
const RESULTS_LIST_LINKS: &str = "ul[data-rte-list=\"default\"] a";

/// Href prefix of per-patent submission links on a detail page.
const PATENT_PATH_PREFIX: &str = "https://www.google.com/patents";

const DETAIL_READY: &str = "h1";
const RESULTS_READY: &str = "body";
const AWARD_LABEL: &str = "Award Amount";

/// One way of reading prior-art ids off a results page.
///
/// The site has shipped two results-page templates; strategies are tried
/// in the fixed order of [`PRIOR_ART_STRATEGIES`] and the first
/// non-empty result wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorArtStrategy {
    /// Split the text after the submissions marker on `;`.
    SubmissionsMarker,
    /// Collect the link texts of the structured submissions list.
    StructuredList,
}

/// Strategy order: the marker parse is higher fidelity, so the
/// structural list only runs when the marker yields nothing.
pub const PRIOR_ART_STRATEGIES: [PriorArtStrategy; 2] = [
    PriorArtStrategy::SubmissionsMarker,
    PriorArtStrategy::StructuredList,
];

impl fmt::Display for PriorArtStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorArtStrategy::SubmissionsMarker => f.write_str("submissions-marker"),
            PriorArtStrategy::StructuredList => f.write_str("structured-list"),
        }
    }
}

impl PriorArtStrategy {
    /// Apply this strategy to a results document.
    pub fn apply(self, doc: &Document) -> Vec<String> {
        match self {
            PriorArtStrategy::SubmissionsMarker => {
                let mut ids = Vec::new();
                for text in doc.texts("p") {
                    if let Some((_, tail)) = text.split_once(SUBMISSIONS_MARKER) {
                        ids.extend(
                            tail.split(';')
                                .map(str::trim)
                                .filter(|token| !token.is_empty())
                                .map(str::to_string),
                        );
                    }
                }
                ids
            }
            PriorArtStrategy::StructuredList => doc
                .texts(RESULTS_LIST_LINKS)
                .into_iter()
                .filter(|text| !text.is_empty())
                .collect(),
        }
    }
}

/// Turns one listing entry into one contest record.
pub struct ContestExtractor<'a, F: PageFetcher> {
    fetcher: &'a F,
    config: &'a CrawlConfig,
}

impl<'a, F: PageFetcher> ContestExtractor<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a CrawlConfig) -> Self {
        Self { fetcher, config }
    }

    /// Extract the contest behind a listing entry.
    ///
    /// Infallible by contract: an unreachable detail page yields an
    /// all-sentinel record carrying the listing-derived URL.
    pub async fn extract(&self, entry: &ListingEntry) -> ContestRecord {
        let doc = match self.wait_for(&entry.detail_url, DETAIL_READY).await {
            Ok(outcome) => {
                if !outcome.is_ready() {
                    warn!(url = %entry.detail_url, "detail heading did not render in time");
                }
                outcome.into_document()
            }
            Err(err) => {
                warn!(url = %entry.detail_url, error = %err, "detail page unreachable, recording sentinels");
                return self.sentinel_record(entry);
            }
        };

        let title = match doc.first_text("h1").filter(|t| !t.is_empty()) {
            Some(title) => title,
            None => {
                warn!(url = %entry.detail_url, "contest title missing");
                NOT_AVAILABLE.to_string()
            }
        };

        match self.config.category {
            Category::Won => {
                let troll = entry.troll_patent_id.clone().unwrap_or_else(|| {
                    warn!(url = %entry.detail_url, "listing card had no patent-reference link");
                    NOT_AVAILABLE.to_string()
                });
                let prior_art = match doc.link_after_text(DOWNLOAD_MARKER) {
                    Some(link) => self.prior_art_from_results(&link.href).await,
                    None => {
                        debug!(url = %entry.detail_url, "no winning prior art link");
                        Vec::new()
                    }
                };
                ContestRecord::Won(WonContest::new(title, troll, prior_art, &entry.detail_url))
            }
            Category::Finished => {
                let troll_link = doc
                    .links("a")
                    .into_iter()
                    .find(|link| link.href.starts_with(PATENT_REFERENCE_PREFIX));
                let troll = troll_link
                    .as_ref()
                    .map(|link| link.text.clone())
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| {
                        warn!(url = %entry.detail_url, "no patent-reference link on detail page");
                        NOT_AVAILABLE.to_string()
                    });

                let award = doc
                    .text_after_label("div", AWARD_LABEL)
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| {
                        warn!(url = %entry.detail_url, "award amount missing");
                        NOT_AVAILABLE.to_string()
                    });

                let prior_art = match doc.link_after_text(DOWNLOAD_MARKER) {
                    Some(link) => self.prior_art_from_results(&link.href).await,
                    None => {
                        submissions_from_detail(&doc, troll_link.as_ref().map(|l| l.href.as_str()))
                    }
                };

                ContestRecord::Finished(FinishedContest::new(
                    troll,
                    prior_art,
                    title,
                    award,
                    &entry.detail_url,
                ))
            }
        }
    }

    /// Follow the download link and run the strategies in order.
    async fn prior_art_from_results(&self, results_url: &str) -> Vec<String> {
        let doc = match self.wait_for(results_url, RESULTS_READY).await {
            Ok(outcome) => outcome.into_document(),
            Err(err) => {
                warn!(url = %results_url, error = %err, "results page unreachable");
                return Vec::new();
            }
        };

        for strategy in PRIOR_ART_STRATEGIES {
            let ids = strategy.apply(&doc);
            if !ids.is_empty() {
                debug!(url = %results_url, strategy = %strategy, count = ids.len(), "prior art extracted");
                return ids;
            }
        }

        debug!(url = %results_url, "results page yielded no prior art");
        Vec::new()
    }

    async fn wait_for(&self, url: &str, selector: &str) -> FetchResult<WaitOutcome> {
        self.fetcher
            .fetch_until(url, selector, self.config.element_timeout())
            .await
    }

    fn sentinel_record(&self, entry: &ListingEntry) -> ContestRecord {
        match self.config.category {
            // The troll id came from the listing, so it survives even
            // when the detail page does not load.
            Category::Won => ContestRecord::Won(WonContest::new(
                NOT_AVAILABLE,
                entry
                    .troll_patent_id
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                Vec::new(),
                &entry.detail_url,
            )),
            Category::Finished => ContestRecord::Finished(FinishedContest::new(
                NOT_AVAILABLE,
                Vec::new(),
                NOT_AVAILABLE,
                NOT_AVAILABLE,
                &entry.detail_url,
            )),
        }
    }
}

/// Finished-layout detail pages list submissions as patent links in the
/// page body. Collects their trailing ids, skipping the link naming the
/// challenged patent, deduplicated preserving first-seen order.
fn submissions_from_detail(doc: &Document, troll_href: Option<&str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut ids = Vec::new();
    for link in doc.links("a") {
        if !link.href.starts_with(PATENT_PATH_PREFIX) {
            continue;
        }
        if Some(link.href.as_str()) == troll_href {
            continue;
        }
        let id = link
            .href
            .rsplit("patents/")
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        if !id.is_empty() && seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    ids
}
