//! Record persistence.

use async_trait::async_trait;

use crate::error::SinkResult;
use crate::types::contest::ContestRecord;

/// Destination for extracted contest records.
///
/// Sinks buffer in memory and write on [`flush`]; `append` reports how
/// many of the offered records were admitted, letting resume-aware sinks
/// silently drop contests they already hold.
///
/// [`flush`]: RecordSink::flush
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Offer a batch of records. Returns the number admitted.
    async fn append(&mut self, records: &[ContestRecord]) -> SinkResult<usize>;

    /// Load whatever a prior run persisted; empty when the target does
    /// not exist yet.
    async fn load_existing(&mut self) -> SinkResult<Vec<ContestRecord>>;

    /// Write buffered records to the backing store.
    async fn flush(&mut self) -> SinkResult<()>;
}
