//! Domain data types for contests, prior art, and crawl configuration.

pub mod config;
pub mod contest;
