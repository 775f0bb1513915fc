//! Core trait abstractions for the crawler.
//!
//! These traits define the seams the pipeline is built against: page
//! fetching with bounded element waits, and record persistence.

pub mod fetcher;
pub mod sink;
