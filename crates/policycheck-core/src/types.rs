//! Domain types shared by the retrieval and evaluation crates.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A window of document text, the unit of retrieval.
///
/// - `source_document`: file name of the parent document, relative to the document directory
/// - `sequence_index`/`total_chunks_in_document`: position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_document: String,
    pub sequence_index: usize,
    pub total_chunks_in_document: usize,
}

impl Chunk {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk returned by a search together with its cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// A compliance rule from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    Partial,
    NonCompliant,
    NotAddressed,
    NotFound,
    Error,
}

impl ComplianceStatus {
    /// Statuses a judge is allowed to return.
    pub const JUDGE_STATUSES: [ComplianceStatus; 4] =
        [Self::Compliant, Self::Partial, Self::NonCompliant, Self::NotAddressed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::Partial => "PARTIAL",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::NotAddressed => "NOT_ADDRESSED",
            Self::NotFound => "NOT_FOUND",
            Self::Error => "ERROR",
        }
    }

    pub fn is_judge_status(&self) -> bool {
        Self::JUDGE_STATUSES.contains(self)
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = String;

    /// Case-insensitive; `-` and spaces are read as `_` ("non-compliant" parses).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        match normalized.as_str() {
            "COMPLIANT" => Ok(Self::Compliant),
            "PARTIAL" => Ok(Self::Partial),
            "NON_COMPLIANT" => Ok(Self::NonCompliant),
            "NOT_ADDRESSED" => Ok(Self::NotAddressed),
            "NOT_FOUND" => Ok(Self::NotFound),
            "ERROR" => Ok(Self::Error),
            _ => Err(format!("unknown compliance status '{}'", s.trim())),
        }
    }
}

/// Provenance for one retrieved chunk attached to a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContent {
    #[serde(rename = "content")]
    pub excerpt: String,
    #[serde(rename = "source")]
    pub source_document: String,
    pub similarity: f32,
}

/// The outcome of evaluating one rule. Field names match the persisted report format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    pub rule_id: String,
    pub rule_title: String,
    #[serde(rename = "compliance_status")]
    pub status: ComplianceStatus,
    pub confidence: f32,
    pub evidence: Vec<String>,
    pub suggestions: Vec<String>,
    pub retrieved_content: Vec<RetrievedContent>,
}

/// Per-status tallies. `errors` absorbs ERROR, NOT_FOUND and anything unrecognised,
/// so the five counters always sum to the number of recorded verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub compliant: usize,
    pub partial: usize,
    pub non_compliant: usize,
    pub not_addressed: usize,
    pub errors: usize,
}

impl ComplianceSummary {
    pub fn record(&mut self, status: &str) {
        match status.trim().to_ascii_uppercase().as_str() {
            "COMPLIANT" => self.compliant += 1,
            "PARTIAL" => self.partial += 1,
            "NON_COMPLIANT" => self.non_compliant += 1,
            "NOT_ADDRESSED" => self.not_addressed += 1,
            _ => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.compliant + self.partial + self.non_compliant + self.not_addressed + self.errors
    }

    /// `(compliant + 0.5 * partial) / total_rules * 100`; 0.0 when there are no rules.
    pub fn score(&self, total_rules: usize) -> f64 {
        if total_rules == 0 {
            return 0.0;
        }
        (self.compliant as f64 + 0.5 * self.partial as f64) / total_rules as f64 * 100.0
    }
}

/// One full run over the catalog. Persisted as a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub timestamp: String,
    pub total_rules: usize,
    pub rule_results: IndexMap<String, RuleVerdict>,
    pub summary: ComplianceSummary,
}

impl ComplianceReport {
    pub fn score(&self) -> f64 {
        self.summary.score(self.total_rules)
    }
}

/// The request handed to a judge: the rendered prompt plus the pieces it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgePrompt {
    pub rule_id: String,
    pub rule_title: String,
    pub keywords: Vec<String>,
    pub context: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_lenient_about_case_and_separators() {
        assert_eq!("compliant".parse::<ComplianceStatus>(), Ok(ComplianceStatus::Compliant));
        assert_eq!(" Non-Compliant ".parse::<ComplianceStatus>(), Ok(ComplianceStatus::NonCompliant));
        assert_eq!("not addressed".parse::<ComplianceStatus>(), Ok(ComplianceStatus::NotAddressed));
        assert!("COMPLIANT/PARTIAL".parse::<ComplianceStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"NON_COMPLIANT\"");
    }

    #[test]
    fn unrecognised_statuses_count_as_errors() {
        let mut summary = ComplianceSummary::default();
        for s in ["compliant", "PARTIAL", "NOT_FOUND", "ERROR", "maybe", "not_addressed"] {
            summary.record(s);
        }
        assert_eq!(summary.compliant, 1);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.not_addressed, 1);
        assert_eq!(summary.errors, 3);
        assert_eq!(summary.total(), 6);
    }

    #[test]
    fn score_gives_partial_half_credit() {
        let summary = ComplianceSummary { compliant: 5, partial: 2, non_compliant: 3, not_addressed: 0, errors: 0 };
        assert!((summary.score(10) - 60.0).abs() < 1e-9);
        assert_eq!(ComplianceSummary::default().score(0), 0.0);
    }
}
