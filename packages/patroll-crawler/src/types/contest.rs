//! Contest records and the two category-specific record shapes.
//!
//! The `won` and `finished` listing categories expose different fields, so
//! each crawl flow produces its own record shape. Both variants sit behind
//! [`ContestRecord`], whose accessors give the evaluator and the sinks a
//! category-agnostic view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder stored whenever a sub-extraction could not produce a value.
///
/// Downstream consumers never see an absent field; they see this sentinel.
pub const NOT_AVAILABLE: &str = "N/A";

/// Listing category selecting which crawl flow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Contests with a published winner
    Won,
    /// Contests that closed without the winner layout
    Finished,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Won => "won",
            Category::Finished => "finished",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized category names.
#[derive(Debug, Error)]
#[error("unknown category: {0} (expected \"won\" or \"finished\")")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "won" => Ok(Category::Won),
            "finished" => Ok(Category::Finished),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// A prior-art identifier with its country-code annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorArtPatent {
    pub patent_id: String,
    /// First two characters of the identifier, uppercased
    pub country_code: String,
}

impl PriorArtPatent {
    /// Build from a raw identifier, deriving the country code.
    pub fn from_id(patent_id: impl Into<String>) -> Self {
        let patent_id = patent_id.into();
        let country_code: String = patent_id
            .chars()
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        Self {
            patent_id,
            country_code,
        }
    }
}

/// Record produced by the `won` crawl flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WonContest {
    pub contest_title: String,
    pub troll_patent_id: String,
    pub prior_art_patents: Vec<PriorArtPatent>,
    pub contest_url: String,
}

impl WonContest {
    /// Build a record, annotating each prior-art id with its country code.
    pub fn new(
        contest_title: impl Into<String>,
        troll_patent_id: impl Into<String>,
        prior_art_ids: Vec<String>,
        contest_url: impl Into<String>,
    ) -> Self {
        Self {
            contest_title: contest_title.into(),
            troll_patent_id: troll_patent_id.into(),
            prior_art_patents: prior_art_ids
                .into_iter()
                .map(PriorArtPatent::from_id)
                .collect(),
            contest_url: contest_url.into(),
        }
    }
}

/// Record produced by the `finished` crawl flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedContest {
    pub troll_patent: String,
    pub prior_art: Vec<String>,
    pub title: String,
    pub award_amount: String,
    pub contest_url: String,
}

impl FinishedContest {
    pub fn new(
        troll_patent: impl Into<String>,
        prior_art: Vec<String>,
        title: impl Into<String>,
        award_amount: impl Into<String>,
        contest_url: impl Into<String>,
    ) -> Self {
        Self {
            troll_patent: troll_patent.into(),
            prior_art,
            title: title.into(),
            award_amount: award_amount.into(),
            contest_url: contest_url.into(),
        }
    }
}

/// One extracted contest, in whichever shape its listing category produces.
///
/// Serialized untagged so the on-disk JSON carries exactly the per-category
/// schema with no wrapper. The variants have disjoint required fields, so
/// deserialization is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContestRecord {
    Won(WonContest),
    Finished(FinishedContest),
}

impl ContestRecord {
    pub fn category(&self) -> Category {
        match self {
            ContestRecord::Won(_) => Category::Won,
            ContestRecord::Finished(_) => Category::Finished,
        }
    }

    /// Listing-derived URL, always present and unique within one crawl.
    pub fn contest_url(&self) -> &str {
        match self {
            ContestRecord::Won(r) => &r.contest_url,
            ContestRecord::Finished(r) => &r.contest_url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContestRecord::Won(r) => &r.contest_title,
            ContestRecord::Finished(r) => &r.title,
        }
    }

    /// Challenged patent id as extracted, possibly the `"N/A"` sentinel.
    pub fn troll_patent_id(&self) -> &str {
        match self {
            ContestRecord::Won(r) => &r.troll_patent_id,
            ContestRecord::Finished(r) => &r.troll_patent,
        }
    }

    /// Prior-art identifiers without country-code annotations.
    pub fn prior_art_ids(&self) -> Vec<&str> {
        match self {
            ContestRecord::Won(r) => r
                .prior_art_patents
                .iter()
                .map(|p| p.patent_id.as_str())
                .collect(),
            ContestRecord::Finished(r) => r.prior_art.iter().map(String::as_str).collect(),
        }
    }

    /// Award text; `None` for the `won` shape, which does not carry one.
    pub fn award_amount(&self) -> Option<&str> {
        match self {
            ContestRecord::Won(_) => None,
            ContestRecord::Finished(r) => Some(&r.award_amount),
        }
    }
}
