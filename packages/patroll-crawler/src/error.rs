//! Typed errors for the crawler library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Most extraction failures
//! never surface here at all: per-contest problems degrade to sentinel
//! values so one bad page cannot abort a batch.

use thiserror::Error;

/// Errors raised while fetching a single page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request failed before a response arrived
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors that abort a crawl run.
///
/// The only fetch-related member is the first listing page being
/// unreachable; every later fetch failure is a termination signal or a
/// sentinel substitution, not an error.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The very first listing page could not be loaded
    #[error("listing page unreachable: {url}")]
    ListingUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Record persistence failed
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Errors raised by record sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A flat-table row did not have the expected shape
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;
