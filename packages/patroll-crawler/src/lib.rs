//! Patroll Contest Crawler
//!
//! Crawls the paginated prior-art contest listings on
//! patroll.unifiedpatents.com, extracts one structured record per
//! contest, persists the records through pluggable sinks, and scores
//! extraction accuracy against a ground-truth mapping.
//!
//! # Design
//!
//! - Two listing flows, `won` and `finished`, sharing one navigator
//! - Extraction never fails a contest, it degrades to `"N/A"` sentinels
//! - Fetching sits behind a trait, so tests run against canned HTML
//! - Sinks deduplicate on contest URL, which makes reruns resumable
//!
//! # Usage
//!
//! ```rust,ignore
//! use patroll_crawler::{
//!     crawl_contests, evaluate, Category, CrawlConfig, GroundTruth, HttpFetcher,
//!     JsonRecordSink, RecordSink,
//! };
//!
//! let config = CrawlConfig::new(Category::Won);
//! let listing = HttpFetcher::new();
//! let detail = HttpFetcher::new();
//! let mut sink = JsonRecordSink::new("scraped_patents.json");
//!
//! let report = crawl_contests(&config, &listing, &detail, &mut sink).await?;
//! println!("appended {} records", report.records_appended);
//!
//! let truth = GroundTruth::from_json_str(&std::fs::read_to_string("truth.json")?)?;
//! let scores = evaluate(&sink.load_existing().await?, &truth);
//! println!("{}", scores.metrics);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (PageFetcher, RecordSink)
//! - [`types`] - Crawl configuration and contest record types
//! - [`dom`] - Fetched-page snapshot with CSS-selector queries
//! - [`navigator`] - Paginated listing walker
//! - [`extractor`] - Per-contest extraction with fallback strategies
//! - [`pipeline`] - End-to-end crawl orchestration
//! - [`sinks`] - JSON and CSV persistence
//! - [`evaluator`] - Accuracy scoring against ground truth
//! - [`testing`] - HTML fixtures for tests

pub mod dom;
pub mod error;
pub mod evaluator;
pub mod extractor;
pub mod fetchers;
pub mod navigator;
pub mod pipeline;
pub mod sinks;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    CrawlError, CrawlResult, FetchError, FetchResult, SinkError, SinkResult,
};
pub use traits::{
    fetcher::{PageFetcher, WaitOutcome},
    sink::RecordSink,
};
pub use types::{
    config::{CrawlConfig, DEFAULT_BASE_URL, DEFAULT_MAX_PAGES},
    contest::{
        Category, ContestRecord, FinishedContest, ParseCategoryError, PriorArtPatent,
        WonContest, NOT_AVAILABLE,
    },
};

// Re-export the crawl entry point and its collaborators
pub use dom::{Document, Link};
pub use extractor::{ContestExtractor, PriorArtStrategy, PRIOR_ART_STRATEGIES};
pub use navigator::{ContestListing, ListingEntry, ListingPage};
pub use pipeline::{crawl_contests, CrawlReport};

// Re-export fetchers
pub use fetchers::{HttpFetcher, MockFetcher};

// Re-export sinks
pub use sinks::{CsvRecordSink, JsonRecordSink, CSV_HEADER};

// Re-export evaluation
pub use evaluator::{
    evaluate, AggregateMetrics, ContestEvaluation, EvaluationReport, GroundTruth,
};
