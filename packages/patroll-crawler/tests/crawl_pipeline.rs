//! Integration tests for the full crawl workflow.
//!
//! These tests drive the crate the way the binary does:
//! 1. Walk the paginated contest listing
//! 2. Extract each contest behind it
//! 3. Persist the records through a sink
//! 4. Score the persisted records against ground truth

use patroll_crawler::{
    crawl_contests, evaluate,
    testing::{results_with_both, results_with_list, results_with_marker, DetailFixture, ListingFixture},
    Category, CrawlConfig, CrawlError, CsvRecordSink, GroundTruth, JsonRecordSink, MockFetcher,
    RecordSink,
};
use tempfile::tempdir;

const BASE: &str = "https://example.com";

fn config(category: Category) -> CrawlConfig {
    CrawlConfig::new(category)
        .with_base_url(BASE)
        .with_rate_limit_ms(0)
        .with_element_timeout_ms(0)
}

/// Three listing pages of won contests, exercising both prior-art
/// strategies, a contest with no results link, and a results page
/// carrying both layouts at once.
fn won_site() -> MockFetcher {
    MockFetcher::new()
        .with_page(
            format!("{BASE}/contests?category=won"),
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
                .with_next_page(2)
                .build(),
        )
        .with_page(
            format!("{BASE}/contests?category=won&page=2"),
            ListingFixture::new()
                .card_with_troll(
                    "/contests/c",
                    "Contest C",
                    "https://www.google.com/patents/US3333333",
                )
                .with_next_page(3)
                .build(),
        )
        .with_page(
            format!("{BASE}/contests?category=won&page=3"),
            ListingFixture::new()
                .card_with_troll(
                    "/contests/d",
                    "Contest D",
                    "https://www.google.com/patents/US4444444",
                )
                .build(),
        )
        .with_page(
            format!("{BASE}/contests/a"),
            DetailFixture::new("Contest A")
                .with_results_link("/results/a")
                .build(),
        )
        .with_page(
            format!("{BASE}/results/a"),
            results_with_marker(&["EP1111111A1", "US5555555B1"]),
        )
        .with_page(
            format!("{BASE}/contests/b"),
            DetailFixture::new("Contest B")
                .with_results_link("/results/b")
                .build(),
        )
        .with_page(
            format!("{BASE}/results/b"),
            results_with_list(&["JP6666666A"]),
        )
        .with_page(
            format!("{BASE}/contests/c"),
            DetailFixture::new("Contest C").build(),
        )
        .with_page(
            format!("{BASE}/contests/d"),
            DetailFixture::new("Contest D")
                .with_results_link("/results/d")
                .build(),
        )
        .with_page(
            format!("{BASE}/results/d"),
            results_with_both(&["DE7777777C1"], &["US0000000X0"]),
        )
}

fn ground_truth() -> GroundTruth {
    GroundTruth::new()
        .with_entry("US1111111", ["EP1111111A1", "JP0000000A"])
        .with_entry("US3333333", ["US9999999B2"])
}

#[tokio::test]
async fn test_multi_page_crawl_persists_every_contest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let cfg = config(Category::Won);
    let site = won_site();
    let mut sink = JsonRecordSink::new(&path);

    let report = crawl_contests(&cfg, &site, &site, &mut sink)
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.contests_discovered, 4);
    assert_eq!(report.contests_extracted, 4);
    assert_eq!(report.records_appended, 4);
    assert_eq!(report.records_skipped, 0);

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 4);

    // Won-shape field names with annotated prior art
    let first = &records[0];
    assert_eq!(first["contest_title"], "Contest A");
    assert_eq!(first["troll_patent_id"], "US1111111");
    assert_eq!(first["contest_url"], format!("{BASE}/contests/a"));
    assert_eq!(first["prior_art_patents"][0]["patent_id"], "EP1111111A1");
    assert_eq!(first["prior_art_patents"][0]["country_code"], "EP");
    assert_eq!(first["prior_art_patents"][1]["patent_id"], "US5555555B1");

    // Structural-list fallback filled contest B
    assert_eq!(records[1]["prior_art_patents"][0]["patent_id"], "JP6666666A");
    // No results link leaves contest C empty
    assert_eq!(records[2]["prior_art_patents"].as_array().unwrap().len(), 0);
    // Marker layout wins when a results page carries both
    assert_eq!(records[3]["prior_art_patents"][0]["patent_id"], "DE7777777C1");
    assert_eq!(records[3]["prior_art_patents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rerun_resumes_without_refetching_details() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let cfg = config(Category::Won);
    let site = won_site();

    let mut sink = JsonRecordSink::new(&path);
    crawl_contests(&cfg, &site, &site, &mut sink).await.unwrap();

    let detail_url = format!("{BASE}/contests/a");
    let fetches_before = site
        .fetch_calls()
        .iter()
        .filter(|url| **url == detail_url)
        .count();
    assert_eq!(fetches_before, 1);

    let mut sink = JsonRecordSink::new(&path);
    let report = crawl_contests(&cfg, &site, &site, &mut sink)
        .await
        .unwrap();

    assert_eq!(report.contests_extracted, 0);
    assert_eq!(report.records_appended, 0);
    assert_eq!(report.records_skipped, 4);

    let fetches_after = site
        .fetch_calls()
        .iter()
        .filter(|url| **url == detail_url)
        .count();
    assert_eq!(fetches_after, 1);
}

#[tokio::test]
async fn test_finished_flow_reads_troll_award_and_submissions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let cfg = config(Category::Finished);

    let site = MockFetcher::new()
        .with_page(
            format!("{BASE}/contests?category=finished"),
            ListingFixture::new()
                .card("/contests/f", "Finished Contest")
                .build(),
        )
        .with_page(
            format!("{BASE}/contests/f"),
            DetailFixture::new("Finished Contest")
                .with_troll_patent("https://www.google.com/patents/US1234567", "US 1,234,567")
                .with_award("$2,500")
                .with_patent_reference("https://www.google.com/patents/US7654321B1")
                .with_patent_reference("https://www.google.com/patents/EP8888888A1")
                .build(),
        );

    let mut sink = JsonRecordSink::new(&path);
    let report = crawl_contests(&cfg, &site, &site, &mut sink)
        .await
        .unwrap();
    assert_eq!(report.records_appended, 1);

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let record = &json.as_array().unwrap()[0];

    // Finished-shape field names with flat prior-art ids
    assert_eq!(record["title"], "Finished Contest");
    assert_eq!(record["troll_patent"], "US 1,234,567");
    assert_eq!(record["award_amount"], "$2,500");
    assert_eq!(record["contest_url"], format!("{BASE}/contests/f"));
    assert_eq!(record["prior_art"][0], "US7654321B1");
    assert_eq!(record["prior_art"][1], "EP8888888A1");
}

#[tokio::test]
async fn test_crawl_then_evaluate_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let cfg = config(Category::Won);
    let site = won_site();

    let mut sink = JsonRecordSink::new(&path);
    crawl_contests(&cfg, &site, &site, &mut sink).await.unwrap();

    let mut reloaded = JsonRecordSink::new(&path);
    let records = reloaded.load_existing().await.unwrap();
    let report = evaluate(&records, &ground_truth());

    // A matched one of two correct ids, C matched none of its one,
    // B and D have trolls the truth does not know
    assert_eq!(report.metrics.total_evaluated, 2);
    assert_eq!(report.metrics.success_rate, 50.0);
    assert_eq!(report.metrics.mean_recall, 0.25);
    assert_eq!(report.metrics.average_hits, 0.5);

    assert!(report.contests[0].success);
    assert_eq!(report.contests[0].recall, 0.5);
    assert!(!report.contests[1].success);
}

#[tokio::test]
async fn test_csv_sink_scores_identically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.csv");
    let cfg = config(Category::Won);
    let site = won_site();

    let mut sink = CsvRecordSink::new(&path);
    crawl_contests(&cfg, &site, &site, &mut sink).await.unwrap();

    let mut reloaded = CsvRecordSink::new(&path);
    let records = reloaded.load_existing().await.unwrap();
    let report = evaluate(&records, &ground_truth());

    assert_eq!(report.metrics.total_evaluated, 2);
    assert_eq!(report.metrics.success_rate, 50.0);
    assert_eq!(report.metrics.mean_recall, 0.25);
    assert_eq!(report.metrics.average_hits, 0.5);
}

#[tokio::test]
async fn test_unreachable_listing_is_fatal() {
    let dir = tempdir().unwrap();
    let cfg = config(Category::Won);
    let site = MockFetcher::new();
    let mut sink = JsonRecordSink::new(dir.path().join("records.json"));

    let err = crawl_contests(&cfg, &site, &site, &mut sink)
        .await
        .unwrap_err();
    match err {
        CrawlError::ListingUnreachable { url, .. } => {
            assert_eq!(url, format!("{BASE}/contests?category=won"));
        }
        other => panic!("expected listing error, got {other:?}"),
    }
}
