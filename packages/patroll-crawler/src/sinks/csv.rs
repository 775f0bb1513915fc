//! Flat CSV persistence.
//!
//! One row per contest with the five evaluator-relevant fields. Writing
//! quotes a field when it contains a comma, quote, or newline and
//! doubles embedded quotes; parsing tolerates CRLF line endings and a
//! missing trailing newline.
//!
//! CSV is a flat format, so reloaded records always come back in the
//! finished shape, with prior-art ids split back out of the joined
//! column.

use std::mem::take;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{SinkError, SinkResult};
use crate::traits::sink::RecordSink;
use crate::types::contest::{ContestRecord, FinishedContest, NOT_AVAILABLE};

/// Column order of the CSV layout.
pub const CSV_HEADER: [&str; 5] = [
    "Troll Patent",
    "Prior Art Patents",
    "Contest Title",
    "Award Amount",
    "Contest URL",
];

/// Sink writing one CSV row per contest record.
///
/// Shares the JSON sink's contract: keyed by contest URL, duplicate
/// appends are no-ops, nothing hits disk before `flush`.
pub struct CsvRecordSink {
    path: PathBuf,
    records: IndexMap<String, ContestRecord>,
}

impl CsvRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: IndexMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

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
impl RecordSink for CsvRecordSink {
    async fn load_existing(&mut self) -> SinkResult<Vec<ContestRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no existing record file");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let mut rows = parse_rows(&contents);
        let mut line = 1;
        if rows
            .first()
            .and_then(|row| row.first())
            .is_some_and(|cell| cell.eq_ignore_ascii_case(CSV_HEADER[0]))
        {
            rows.remove(0);
            line += 1;
        }

        for row in &rows {
            let record = record_from_row(row, line)?;
            self.records
                .entry(record.contest_url().to_string())
                .or_insert(record);
            line += 1;
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
        let mut out = String::new();
        push_row(&mut out, CSV_HEADER.iter().map(|cell| cell.to_string()));
        for record in self.records.values() {
            push_row(&mut out, row_from_record(record));
        }
        tokio::fs::write(&self.path, out)
            .await
            .map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), count = self.records.len(), "records written");
        Ok(())
    }
}

fn row_from_record(record: &ContestRecord) -> impl Iterator<Item = String> {
    [
        record.troll_patent_id().to_string(),
        record.prior_art_ids().join(", "),
        record.title().to_string(),
        record.award_amount().unwrap_or(NOT_AVAILABLE).to_string(),
        record.contest_url().to_string(),
    ]
    .into_iter()
}

fn record_from_row(row: &[String], line: usize) -> SinkResult<ContestRecord> {
    if row.len() != CSV_HEADER.len() {
        return Err(SinkError::MalformedRow {
            line,
            reason: format!(
                "expected {} columns, found {}",
                CSV_HEADER.len(),
                row.len()
            ),
        });
    }
    let prior_art = row[1]
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    Ok(ContestRecord::Finished(FinishedContest::new(
        row[0].as_str(),
        prior_art,
        row[2].as_str(),
        row[3].as_str(),
        row[4].as_str(),
    )))
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row(out: &mut String, row: impl IntoIterator<Item = String>) {
    let mut first = true;
    for cell in row {
        if !first {
            out.push(',');
        } else {
            first = false;
        }
        if needs_quotes(&cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(&cell);
        }
    }
    out.push('\n');
}

/// Quote-aware split into rows of fields. Blank lines are dropped;
/// unterminated quotes at end of input flush what was read.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
