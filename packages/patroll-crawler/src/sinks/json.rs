//! JSON persistence.
//!
//! Stores records as a pretty-printed JSON array. Both record shapes
//! serialize with their own field names, so a file written by one crawl
//! category reloads cleanly alongside the other.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{SinkError, SinkResult};
use crate::traits::sink::RecordSink;
use crate::types::contest::ContestRecord;

/// Sink writing a JSON array of contest records.
///
/// Records are keyed by contest URL; appending a URL that is already
/// present is a no-op. Insertion order is preserved in the output.
pub struct JsonRecordSink {
    path: PathBuf,
    records: IndexMap<String, ContestRecord>,
}

impl JsonRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: IndexMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records currently held, persisted or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl RecordSink for JsonRecordSink {
    async fn load_existing(&mut self) -> SinkResult<Vec<ContestRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no existing record file");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let existing: Vec<ContestRecord> = serde_json::from_str(&contents)?;
        for record in existing {
            self.records
                .entry(record.contest_url().to_string())
                .or_insert(record);
        }
        Ok(self.records.values().cloned().collect())
    }

    async fn append(&mut self, records: &[ContestRecord]) -> SinkResult<usize> {
        let mut admitted = 0;
        for record in records {
            let url = record.contest_url().to_string();
            if self.records.contains_key(&url) {
                debug!(url = %url, "record already persisted, skipping");
                continue;
            }
            self.records.insert(url, record.clone());
            admitted += 1;
        }
        Ok(admitted)
    }

    async fn flush(&mut self) -> SinkResult<()> {
        let records: Vec<&ContestRecord> = self.records.values().collect();
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), count = records.len(), "records written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::contest::{FinishedContest, WonContest};
    use tempfile::tempdir;

    fn won(url: &str) -> ContestRecord {
        ContestRecord::Won(WonContest::new(
            "Contest",
            "US1234567B2",
            vec!["EP1111111A1".to_string()],
            url,
        ))
    }

    fn finished(url: &str) -> ContestRecord {
        ContestRecord::Finished(FinishedContest::new(
            "US7654321",
            vec!["US2222222B1".to_string()],
            "Another Contest",
            "$2,000",
            url,
        ))
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let mut sink = JsonRecordSink::new(dir.path().join("records.json"));
        assert!(sink.load_existing().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_counts_and_skips_duplicates() {
        let dir = tempdir().unwrap();
        let mut sink = JsonRecordSink::new(dir.path().join("records.json"));

        let first = [won("https://example.com/contests/a")];
        assert_eq!(sink.append(&first).await.unwrap(), 1);

        let batch = [
            won("https://example.com/contests/a"),
            finished("https://example.com/contests/b"),
        ];
        assert_eq!(sink.append(&batch).await.unwrap(), 1);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_flush_then_reload_round_trips_both_shapes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let mut sink = JsonRecordSink::new(&path);
        sink.append(&[
            won("https://example.com/contests/a"),
            finished("https://example.com/contests/b"),
        ])
        .await
        .unwrap();
        sink.flush().await.unwrap();

        let mut reloaded = JsonRecordSink::new(&path);
        let records = reloaded.load_existing().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].troll_patent_id(), "US1234567B2");
        assert_eq!(records[0].award_amount(), None);
        assert_eq!(records[1].award_amount(), Some("$2,000"));
        assert_eq!(records[1].prior_art_ids(), vec!["US2222222B1"]);
    }

    #[tokio::test]
    async fn test_resume_keeps_first_record_per_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let mut sink = JsonRecordSink::new(&path);
        sink.append(&[won("https://example.com/contests/a")])
            .await
            .unwrap();
        sink.flush().await.unwrap();

        let mut resumed = JsonRecordSink::new(&path);
        resumed.load_existing().await.unwrap();
        let admitted = resumed
            .append(&[
                finished("https://example.com/contests/a"),
                finished("https://example.com/contests/c"),
            ])
            .await
            .unwrap();
        assert_eq!(admitted, 1);
        resumed.flush().await.unwrap();

        let mut check = JsonRecordSink::new(&path);
        let records = check.load_existing().await.unwrap();
        assert_eq!(records.len(), 2);
        // The record already on disk for /contests/a was not overwritten
        assert_eq!(records[0].troll_patent_id(), "US1234567B2");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let mut sink = JsonRecordSink::new(&path);
        assert!(matches!(
            sink.load_existing().await,
            Err(SinkError::Json(_))
        ));
    }
}
