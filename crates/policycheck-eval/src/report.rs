//! Full catalog runs, report persistence and the text renderings of a report.
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::info;

use policycheck_core::rules::RuleCatalog;
use policycheck_core::types::{ComplianceReport, ComplianceStatus, ComplianceSummary, RuleVerdict};
use policycheck_core::{Error, Result};

use crate::evaluator::Evaluator;

/// Rules whose gaps get an explicit priority callout.
pub const CRITICAL_RULES: [&str; 3] = ["data_protection_compliance", "security_incident_response", "liability_limitation"];

/// The persisted report file. Each save replaces the previous report whole.
pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, report: &ComplianceReport) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| Error::persistence(&parent, e))?;
        let tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| Error::persistence(&parent, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, report).map_err(|e| Error::persistence(&self.path, e))?;
            writer.flush().map_err(|e| Error::persistence(&self.path, e))?;
        }
        tmp.as_file().sync_all().map_err(|e| Error::persistence(&self.path, e))?;
        tmp.persist(&self.path).map_err(|e| Error::persistence(&self.path, e.error))?;
        info!(path = %self.path.display(), "saved compliance report");
        Ok(())
    }

    /// `None` when no report has been written yet.
    pub fn load(&self) -> Result<Option<ComplianceReport>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::persistence(&self.path, e)),
        };
        let report = serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::persistence(&self.path, e))?;
        Ok(Some(report))
    }
}

/// Runs every rule in catalog order and persists the tallied report.
pub struct ReportAggregator<'a> {
    evaluator: Evaluator<'a>,
    store: ReportStore,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(evaluator: Evaluator<'a>, store: ReportStore) -> Self {
        Self { evaluator, store }
    }

    pub fn run(&self, rules: &RuleCatalog) -> Result<ComplianceReport> {
        self.run_with_progress(rules, |_| {})
    }

    /// Like `run`, calling `on_verdict` after each rule. Nothing is written if a rule
    /// cannot be evaluated at all (e.g. the index is not loaded).
    pub fn run_with_progress<F>(&self, rules: &RuleCatalog, mut on_verdict: F) -> Result<ComplianceReport>
    where
        F: FnMut(&RuleVerdict),
    {
        info!(rules = rules.len(), "starting compliance check");
        let mut rule_results = IndexMap::with_capacity(rules.len());
        let mut summary = ComplianceSummary::default();
        for (id, rule) in rules {
            let verdict = self.evaluator.evaluate(rule)?;
            summary.record(verdict.status.as_str());
            on_verdict(&verdict);
            rule_results.insert(id.clone(), verdict);
        }
        let report = ComplianceReport {
            timestamp: Utc::now().to_rfc3339(),
            total_rules: rules.len(),
            rule_results,
            summary,
        };
        self.store.save(&report)?;
        info!(score = report.score(), errors = report.summary.errors, "compliance check complete");
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "High compliance achieved",
            Self::Good => "Moderate compliance, some improvements needed",
            Self::Fair => "Low compliance, significant improvements required",
            Self::Poor => "Critical compliance issues need immediate attention",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
        };
        f.write_str(label)
    }
}

pub fn rating(score: f64) -> Rating {
    if score >= 80.0 {
        Rating::Excellent
    } else if score >= 60.0 {
        Rating::Good
    } else if score >= 40.0 {
        Rating::Fair
    } else {
        Rating::Poor
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn render_summary(report: &ComplianceReport) -> String {
    let s = &report.summary;
    let total = report.total_rules;
    format!(
        "COMPLIANCE SUMMARY\n\
         ==================\n\
         \n\
         Total Rules Checked: {total}\n\
         \n\
         Compliant: {} ({:.1}%)\n\
         Partial: {} ({:.1}%)\n\
         Non-Compliant: {} ({:.1}%)\n\
         Not Addressed: {} ({:.1}%)\n\
         Errors: {} ({:.1}%)\n\
         \n\
         Overall Compliance Score: {:.1}%\n",
        s.compliant,
        percent(s.compliant, total),
        s.partial,
        percent(s.partial, total),
        s.non_compliant,
        percent(s.non_compliant, total),
        s.not_addressed,
        percent(s.not_addressed, total),
        s.errors,
        percent(s.errors, total),
        report.score(),
        total = total,
    )
}

pub fn recommendations(report: &ComplianceReport) -> Vec<String> {
    let s = &report.summary;
    let mut out = Vec::new();
    if s.non_compliant > 0 {
        out.push(format!("Address {} non-compliant rules immediately", s.non_compliant));
    }
    if s.not_addressed > 0 {
        out.push(format!("Create policies for {} unaddressed compliance areas", s.not_addressed));
    }
    if s.partial > 0 {
        out.push(format!("Enhance {} partially compliant policies", s.partial));
    }
    for id in CRITICAL_RULES {
        if let Some(v) = report.rule_results.get(id) {
            if matches!(v.status, ComplianceStatus::NonCompliant | ComplianceStatus::NotAddressed) {
                out.push(format!("Priority: Address {} compliance", v.rule_title));
            }
        }
    }
    if out.is_empty() {
        out.push("Maintain current compliance standards and conduct regular reviews".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(id: &str, title: &str, status: ComplianceStatus) -> RuleVerdict {
        RuleVerdict {
            rule_id: id.into(),
            rule_title: title.into(),
            status,
            confidence: 0.5,
            evidence: vec![],
            suggestions: vec![],
            retrieved_content: vec![],
        }
    }

    fn report(verdicts: Vec<RuleVerdict>) -> ComplianceReport {
        let mut summary = ComplianceSummary::default();
        for v in &verdicts {
            summary.record(v.status.as_str());
        }
        ComplianceReport {
            timestamp: "2024-01-01T00:00:00+00:00".into(),
            total_rules: verdicts.len(),
            rule_results: verdicts.into_iter().map(|v| (v.rule_id.clone(), v)).collect(),
            summary,
        }
    }

    #[test]
    fn ratings_follow_score_bands() {
        assert_eq!(rating(80.0), Rating::Excellent);
        assert_eq!(rating(79.9), Rating::Good);
        assert_eq!(rating(60.0), Rating::Good);
        assert_eq!(rating(40.0), Rating::Fair);
        assert_eq!(rating(0.0), Rating::Poor);
        assert_eq!(Rating::Fair.to_string(), "FAIR");
    }

    #[test]
    fn summary_shows_counts_percentages_and_score() {
        let r = report(vec![
            verdict("a", "A", ComplianceStatus::Compliant),
            verdict("b", "B", ComplianceStatus::Partial),
            verdict("c", "C", ComplianceStatus::NonCompliant),
            verdict("d", "D", ComplianceStatus::Error),
        ]);
        let text = render_summary(&r);
        assert!(text.starts_with("COMPLIANCE SUMMARY"));
        assert!(text.contains("Total Rules Checked: 4"));
        assert!(text.contains("Compliant: 1 (25.0%)"));
        assert!(text.contains("Partial: 1 (25.0%)"));
        assert!(text.contains("Errors: 1 (25.0%)"));
        assert!(text.contains("Overall Compliance Score: 37.5%"));
    }

    #[test]
    fn empty_report_renders_zero_percentages() {
        let text = render_summary(&report(vec![]));
        assert!(text.contains("Overall Compliance Score: 0.0%"));
    }

    #[test]
    fn recommendations_call_out_gaps_and_critical_rules() {
        let r = report(vec![
            verdict("data_protection_compliance", "Data Protection and Privacy Laws", ComplianceStatus::NotAddressed),
            verdict("payment_terms", "Payment Terms and Conditions", ComplianceStatus::NonCompliant),
            verdict("liability_limitation", "Liability Limitation Clauses", ComplianceStatus::Partial),
        ]);
        assert_eq!(
            recommendations(&r),
            vec![
                "Address 1 non-compliant rules immediately",
                "Create policies for 1 unaddressed compliance areas",
                "Enhance 1 partially compliant policies",
                "Priority: Address Data Protection and Privacy Laws compliance",
            ]
        );
    }

    #[test]
    fn clean_report_recommends_maintenance() {
        let r = report(vec![verdict("a", "A", ComplianceStatus::Compliant)]);
        assert_eq!(recommendations(&r), vec!["Maintain current compliance standards and conduct regular reviews"]);
    }
}
