//! Patroll contest crawler CLI
//!
//! Crawls the contest listings on patroll.unifiedpatents.com and scores
//! previously scraped records against a ground-truth mapping.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use patroll_crawler::{
    crawl_contests, evaluate, Category, ContestRecord, CrawlConfig, CsvRecordSink, GroundTruth,
    HttpFetcher, JsonRecordSink, RecordSink, DEFAULT_BASE_URL, DEFAULT_MAX_PAGES,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "patroll")]
#[command(about = "Crawl patroll.unifiedpatents.com contests and score the extractions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a contest category and persist the records
    Crawl {
        /// Listing flow to crawl
        #[arg(value_enum)]
        category: CategoryArg,

        /// Output file; a `.csv` extension selects the CSV layout,
        /// anything else gets JSON
        #[arg(long, default_value = "scraped_patents.json")]
        out: PathBuf,

        /// Listing site to crawl
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Stop after this many listing pages
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: usize,

        /// Pause between successive fetches, in milliseconds
        #[arg(long, default_value_t = 1_000)]
        rate_limit_ms: u64,
    },

    /// Score scraped records against a ground-truth file
    Evaluate {
        /// Records file written by `crawl`
        records: PathBuf,

        /// JSON object mapping troll patent ids to correct prior-art ids
        ground_truth: PathBuf,

        /// Print each contest's matches, not just the totals
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    /// Contests with announced winning prior art
    Won,
    /// Contests that are closed for submissions
    Finished,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Won => Category::Won,
            CategoryArg::Finished => Category::Finished,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,patroll_crawler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    tracing::info!("Starting patroll CLI");

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            category,
            out,
            base_url,
            max_pages,
            rate_limit_ms,
        } => cmd_crawl(category.into(), &out, base_url, max_pages, rate_limit_ms).await,
        Commands::Evaluate {
            records,
            ground_truth,
            verbose,
        } => cmd_evaluate(&records, &ground_truth, verbose).await,
    }
}

async fn cmd_crawl(
    category: Category,
    out: &Path,
    base_url: String,
    max_pages: usize,
    rate_limit_ms: u64,
) -> Result<()> {
    let config = CrawlConfig::new(category)
        .with_base_url(base_url)
        .with_max_pages(max_pages)
        .with_rate_limit_ms(rate_limit_ms);

    // Listing and detail pages browse through separate sessions
    let listing = HttpFetcher::from_config(&config);
    let detail = HttpFetcher::from_config(&config);

    let report = if is_csv(out) {
        let mut sink = CsvRecordSink::new(out);
        crawl_contests(&config, &listing, &detail, &mut sink).await?
    } else {
        let mut sink = JsonRecordSink::new(out);
        crawl_contests(&config, &listing, &detail, &mut sink).await?
    };

    println!(
        "Crawled {} pages, {} contests ({} new, {} already scraped) -> {}",
        report.pages_visited,
        report.contests_discovered,
        report.records_appended,
        report.records_skipped,
        out.display()
    );
    Ok(())
}

async fn cmd_evaluate(records_path: &Path, truth_path: &Path, verbose: bool) -> Result<()> {
    let records = load_records(records_path).await?;

    let contents = tokio::fs::read_to_string(truth_path)
        .await
        .with_context(|| format!("Failed to read ground truth from {}", truth_path.display()))?;
    let truth = GroundTruth::from_json_str(&contents)
        .with_context(|| format!("Invalid ground truth in {}", truth_path.display()))?;

    let report = evaluate(&records, &truth);

    if verbose {
        for eval in &report.contests {
            let matched: Vec<&str> = eval.matches.iter().map(String::as_str).collect();
            println!(
                "{}: {} match(es) [{}], recall {:.2}",
                eval.troll_patent_id,
                eval.matches.len(),
                matched.join(", "),
                eval.recall
            );
        }
    }
    println!("{}", report.metrics);
    Ok(())
}

async fn load_records(path: &Path) -> Result<Vec<ContestRecord>> {
    tokio::fs::metadata(path)
        .await
        .with_context(|| format!("No records file at {}", path.display()))?;

    let records = if is_csv(path) {
        let mut sink = CsvRecordSink::new(path);
        sink.load_existing().await?
    } else {
        let mut sink = JsonRecordSink::new(path);
        sink.load_existing().await?
    };
    // A crawl that found nothing still evaluates, to a zero-total report
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "records file holds no contests");
    }
    Ok(records)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
