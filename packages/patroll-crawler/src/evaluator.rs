//! Accuracy evaluation against a ground-truth mapping.
//!
//! Ground truth maps a troll patent id to the prior-art ids a correct
//! extraction should have found. Matching is case-insensitive on both
//! the troll id and the prior-art ids; records whose troll id is
//! missing, the `"N/A"` sentinel, or unknown to the mapping are skipped
//! rather than counted as failures.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::types::contest::{ContestRecord, NOT_AVAILABLE};

/// Known-correct prior art per troll patent.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    entries: HashMap<String, BTreeSet<String>>,
}

impl GroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(troll id, prior-art ids)` pairs. Ids are
    /// uppercased on the way in, so lookups never depend on the case
    /// the source file used.
    pub fn from_pairs<T, I, P>(pairs: I) -> Self
    where
        T: AsRef<str>,
        P: AsRef<str>,
        I: IntoIterator<Item = (T, Vec<P>)>,
    {
        let mut truth = Self::new();
        for (troll, ids) in pairs {
            truth.insert(troll.as_ref(), ids.iter().map(AsRef::as_ref));
        }
        truth
    }

    /// Parse the JSON object form, `{"US1234567": ["EP1111111", ...]}`.
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(contents)?;
        Ok(Self::from_pairs(raw))
    }

    pub fn with_entry<'a>(
        mut self,
        troll: &str,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.insert(troll, ids);
        self
    }

    fn insert<'a>(&mut self, troll: &str, ids: impl IntoIterator<Item = &'a str>) {
        self.entries.insert(
            troll.trim().to_uppercase(),
            ids.into_iter().map(|id| id.trim().to_uppercase()).collect(),
        );
    }

    /// Correct prior art for a troll id, matched case-insensitively.
    pub fn prior_art_for(&self, troll: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(&troll.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome for a single evaluated contest.
#[derive(Debug, Clone, Serialize)]
pub struct ContestEvaluation {
    pub contest_url: String,
    /// Troll id normalized to uppercase.
    pub troll_patent_id: String,
    /// Extracted ids confirmed by the ground truth, normalized.
    pub matches: BTreeSet<String>,
    /// At least one extracted id was correct.
    pub success: bool,
    /// Matched share of the correct set, `0.0` when that set is empty.
    pub recall: f64,
}

/// Metrics over every evaluated contest. All zero when nothing
/// qualified for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateMetrics {
    pub total_evaluated: usize,
    /// Percentage of evaluated contests with at least one match.
    pub success_rate: f64,
    pub mean_recall: f64,
    /// Mean number of confirmed ids per evaluated contest.
    pub average_hits: f64,
}

impl fmt::Display for AggregateMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Contests Evaluated: {}", self.total_evaluated)?;
        writeln!(f, "Success Rate: {:.2}%", self.success_rate)?;
        writeln!(f, "Average Recall: {:.2}", self.mean_recall)?;
        write!(
            f,
            "Average Ground Truth Hits: {:.2} per contest",
            self.average_hits
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub contests: Vec<ContestEvaluation>,
    pub metrics: AggregateMetrics,
}

/// Score extracted records against the ground truth.
pub fn evaluate(records: &[ContestRecord], truth: &GroundTruth) -> EvaluationReport {
    let mut contests = Vec::new();
    let mut successes = 0usize;
    let mut recall_sum = 0.0f64;
    let mut hits = 0usize;

    for record in records {
        let troll_raw = record.troll_patent_id().trim();
        if troll_raw.is_empty() || troll_raw == NOT_AVAILABLE {
            debug!(url = %record.contest_url(), "record has no troll patent id, skipping");
            continue;
        }
        let troll = troll_raw.to_uppercase();
        let Some(correct) = truth.prior_art_for(&troll) else {
            debug!(troll = %troll, "troll patent not in ground truth, skipping");
            continue;
        };

        let extracted: BTreeSet<String> = record
            .prior_art_ids()
            .iter()
            .map(|id| id.trim().to_uppercase())
            .filter(|id| !id.is_empty())
            .collect();
        let matches: BTreeSet<String> = extracted.intersection(correct).cloned().collect();
        let success = !matches.is_empty();
        let recall = if correct.is_empty() {
            0.0
        } else {
            matches.len() as f64 / correct.len() as f64
        };

        if success {
            successes += 1;
        }
        recall_sum += recall;
        hits += matches.len();
        contests.push(ContestEvaluation {
            contest_url: record.contest_url().to_string(),
            troll_patent_id: troll,
            matches,
            success,
            recall,
        });
    }

    let total = contests.len();
    let metrics = if total == 0 {
        AggregateMetrics::default()
    } else {
        AggregateMetrics {
            total_evaluated: total,
            success_rate: 100.0 * successes as f64 / total as f64,
            mean_recall: recall_sum / total as f64,
            average_hits: hits as f64 / total as f64,
        }
    };

    EvaluationReport { contests, metrics }
}
