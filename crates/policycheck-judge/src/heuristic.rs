//! Offline judge: scores a rule by how many of its keywords the context mentions.
//!
//! Deterministic, no network. Answers in the same fenced-JSON shape a hosted
//! model is asked for, so the evaluator parses both identically.
use serde_json::json;

use policycheck_core::traits::Judge;
use policycheck_core::types::{ComplianceStatus, JudgePrompt};
use policycheck_core::JudgeError;

const MAX_EVIDENCE: usize = 3;
const MAX_EVIDENCE_CHARS: usize = 240;

#[derive(Debug, Clone, Copy)]
pub struct HeuristicJudge {
    compliant_at: f32,
    partial_at: f32,
}

impl Default for HeuristicJudge {
    fn default() -> Self {
        Self { compliant_at: 0.6, partial_at: 0.3 }
    }
}

impl HeuristicJudge {
    pub fn new() -> Self {
        Self::default()
    }

    fn status_for(&self, coverage: f32) -> ComplianceStatus {
        if coverage >= self.compliant_at {
            ComplianceStatus::Compliant
        } else if coverage >= self.partial_at {
            ComplianceStatus::Partial
        } else {
            ComplianceStatus::NotAddressed
        }
    }
}

/// Sentences of `context` mentioning any of `keywords`, in order of appearance.
fn evidence(context: &str, keywords: &[String]) -> Vec<String> {
    context
        .split(|c| c == '.' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let lower = s.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .take(MAX_EVIDENCE)
        .map(|s| s.chars().take(MAX_EVIDENCE_CHARS).collect())
        .collect()
}

impl Judge for HeuristicJudge {
    fn name(&self) -> &str {
        "offline"
    }

    fn judge(&self, prompt: &JudgePrompt) -> Result<String, JudgeError> {
        if prompt.context.trim().is_empty() {
            return Err(JudgeError::EmptyResponse);
        }
        let context = prompt.context.to_lowercase();
        let keywords: Vec<String> = prompt.keywords.iter().map(|k| k.to_lowercase()).collect();
        let (found, missing): (Vec<&String>, Vec<&String>) = keywords.iter().partition(|k| context.contains(k.as_str()));
        let coverage = if keywords.is_empty() { 0.0 } else { found.len() as f32 / keywords.len() as f32 };
        let status = self.status_for(coverage);

        let suggestions: Vec<String> = match status {
            ComplianceStatus::Compliant => vec![],
            _ => missing
                .iter()
                .map(|k| format!("Add explicit language covering '{}' for {}", k, prompt.rule_title))
                .collect(),
        };
        let answer = json!({
            "compliance_status": status.as_str(),
            "confidence": ((0.5 + coverage / 2.0) * 100.0).round() / 100.0,
            "evidence": evidence(&prompt.context, &keywords),
            "suggestions": suggestions,
        });
        Ok(format!("```json\n{:#}\n```", answer))
    }
}
