//! End-to-end crawl orchestration.
//!
//! Walks the listing with one fetcher, extracts each discovered contest
//! with another, and appends the records to a sink page by page.
//! Separate fetchers mirror the separate browsing sessions the two
//! flows use; passing the same fetcher twice is fine when that
//! separation does not matter.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CrawlResult;
use crate::extractor::ContestExtractor;
use crate::navigator::ContestListing;
use crate::traits::fetcher::PageFetcher;
use crate::traits::sink::RecordSink;
use crate::types::config::CrawlConfig;

/// Counters summarizing one crawl run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub pages_visited: usize,
    pub contests_discovered: usize,
    pub contests_extracted: usize,
    pub records_appended: usize,
    /// Contests skipped because the sink already held their URL.
    pub records_skipped: usize,
}

/// Crawl every listing page of the configured category and persist the
/// extracted records.
///
/// Contests whose URL the sink already holds are not re-fetched, so a
/// crawl interrupted partway can simply be run again. Listing
/// navigation errors on the first page and sink errors abort the run;
/// per-contest extraction never does.
pub async fn crawl_contests<L, D, S>(
    config: &CrawlConfig,
    listing_fetcher: &L,
    detail_fetcher: &D,
    sink: &mut S,
) -> CrawlResult<CrawlReport>
where
    L: PageFetcher,
    D: PageFetcher,
    S: RecordSink,
{
    info!(
        category = %config.category,
        base_url = %config.base_url,
        max_pages = config.max_pages,
        "starting crawl"
    );

    let existing = sink.load_existing().await?;
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|record| record.contest_url().to_string())
        .collect();
    if !seen.is_empty() {
        info!(count = seen.len(), "resuming past previously scraped contests");
    }

    let mut report = CrawlReport::default();
    let extractor = ContestExtractor::new(detail_fetcher, config);
    let mut listing = ContestListing::new(listing_fetcher, config);

    while let Some(page) = listing.next_page().await? {
        report.pages_visited += 1;
        report.contests_discovered += page.entries.len();
        debug!(
            page = page.number,
            entries = page.entries.len(),
            "processing listing page"
        );

        let mut batch = Vec::new();
        for entry in &page.entries {
            if seen.contains(&entry.detail_url) {
                debug!(url = %entry.detail_url, "contest already scraped, skipping");
                report.records_skipped += 1;
                continue;
            }
            if report.contests_extracted > 0 && config.rate_limit_ms > 0 {
                tokio::time::sleep(config.rate_limit()).await;
            }
            let record = extractor.extract(entry).await;
            report.contests_extracted += 1;
            seen.insert(entry.detail_url.clone());
            batch.push(record);
        }

        if !batch.is_empty() {
            report.records_appended += sink.append(&batch).await?;
        }
    }

    sink.flush().await?;
    info!(
        pages = report.pages_visited,
        discovered = report.contests_discovered,
        extracted = report.contests_extracted,
        appended = report.records_appended,
        skipped = report.records_skipped,
        "crawl finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrawlError;
    use crate::fetchers::MockFetcher;
    use crate::sinks::JsonRecordSink;
    use crate::testing::{results_with_marker, DetailFixture, ListingFixture};
    use crate::types::contest::Category;
    use tempfile::tempdir;

    fn config() -> CrawlConfig {
        CrawlConfig::new(Category::Won)
            .with_base_url("https://example.com")
            .with_rate_limit_ms(0)
            .with_element_timeout_ms(0)
    }

    fn mock_site() -> MockFetcher {
        MockFetcher::new()
            .with_page(
                "https://example.com/contests?category=won",
                ListingFixture::new()
                    .card_with_troll(
                        "/contests/a",
                        "Contest A",
                        "https://www.google.com/patents/US1111111",
                    )
                    .card_with_troll(
                        "/contests/b",
                        "Contest B",
                        "https://www.google.com/patents/US2222222",
                    )
                    .build(),
            )
            .with_page(
                "https://example.com/contests/a",
                DetailFixture::new("Contest A")
                    .with_results_link("/results/a")
                    .build(),
            )
            .with_page(
                "https://example.com/results/a",
                results_with_marker(&["EP3333333A1"]),
            )
            .with_page(
                "https://example.com/contests/b",
                DetailFixture::new("Contest B").build(),
            )
    }

    #[tokio::test]
    async fn test_crawl_extracts_and_persists_every_contest() {
        let dir = tempdir().unwrap();
        let cfg = config();
        let mock = mock_site();
        let mut sink = JsonRecordSink::new(dir.path().join("records.json"));

        let report = crawl_contests(&cfg, &mock, &mock, &mut sink)
            .await
            .unwrap();

        assert_eq!(report.pages_visited, 1);
        assert_eq!(report.contests_discovered, 2);
        assert_eq!(report.contests_extracted, 2);
        assert_eq!(report.records_appended, 2);
        assert_eq!(report.records_skipped, 0);

        let mut check = JsonRecordSink::new(dir.path().join("records.json"));
        let records = check.load_existing().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].troll_patent_id(), "US1111111");
        assert_eq!(records[0].prior_art_ids(), vec!["EP3333333A1"]);
        assert!(records[1].prior_art_ids().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        let cfg = config();
        let mock = mock_site();

        let mut sink = JsonRecordSink::new(&path);
        crawl_contests(&cfg, &mock, &mock, &mut sink).await.unwrap();

        let mut sink = JsonRecordSink::new(&path);
        let report = crawl_contests(&cfg, &mock, &mock, &mut sink)
            .await
            .unwrap();

        assert_eq!(report.contests_extracted, 0);
        assert_eq!(report.records_appended, 0);
        assert_eq!(report.records_skipped, 2);
    }

    #[tokio::test]
    async fn test_unreachable_listing_aborts_the_run() {
        let dir = tempdir().unwrap();
        let cfg = config();
        let mock = MockFetcher::new();
        let mut sink = JsonRecordSink::new(dir.path().join("records.json"));

        let result = crawl_contests(&cfg, &mock, &mock, &mut sink).await;
        assert!(matches!(
            result,
            Err(CrawlError::ListingUnreachable { .. })
        ));
    }
}
