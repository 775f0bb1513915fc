//! Persistence backends for contest records.
//!
//! Both sinks deduplicate on contest URL and only touch the filesystem
//! in `flush`, so a crawl can append page by page and still write the
//! file once.

mod csv;
mod json;

pub use csv::{CsvRecordSink, CSV_HEADER};
pub use json::JsonRecordSink;
