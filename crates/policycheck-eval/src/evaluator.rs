use tracing::{debug, warn};

use policycheck_core::traits::{ChunkSearcher, Judge};
use policycheck_core::types::{ComplianceStatus, RetrievedChunk, RetrievedContent, Rule, RuleVerdict};
use policycheck_core::Result;

use crate::parser::parse_judge_response;
use crate::prompt::{context, judge_prompt, retrieval_query};

/// Excerpt length kept per retrieved chunk in a verdict.
pub const EXCERPT_CHARS: usize = 200;

pub const NOT_FOUND_SUGGESTION: &str = "No relevant policy documents found for this rule";

/// Evaluates one rule at a time against a searcher and a judge.
pub struct Evaluator<'a> {
    searcher: &'a dyn ChunkSearcher,
    judge: &'a dyn Judge,
    top_k: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(searcher: &'a dyn ChunkSearcher, judge: &'a dyn Judge, top_k: usize) -> Self {
        Self { searcher, judge, top_k }
    }

    /// Retrieval failures propagate; judge and parse failures become an ERROR verdict.
    pub fn evaluate(&self, rule: &Rule) -> Result<RuleVerdict> {
        let results = self.searcher.search(&retrieval_query(rule), self.top_k)?;
        if results.is_empty() {
            debug!(rule = %rule.id, "no relevant chunks");
            return Ok(verdict(rule, ComplianceStatus::NotFound, vec![NOT_FOUND_SUGGESTION.to_string()]));
        }

        let prompt = judge_prompt(rule, context(&results));
        let answer = self
            .judge
            .judge(&prompt)
            .map_err(policycheck_core::Error::from)
            .and_then(|text| parse_judge_response(&text));
        match answer {
            Ok(answer) => {
                debug!(rule = %rule.id, judge = self.judge.name(), status = %answer.status, "judged");
                Ok(RuleVerdict {
                    rule_id: rule.id.clone(),
                    rule_title: rule.title.clone(),
                    status: answer.status,
                    confidence: answer.confidence,
                    evidence: answer.evidence,
                    suggestions: answer.suggestions,
                    retrieved_content: provenance(&results),
                })
            }
            Err(e) => {
                warn!(rule = %rule.id, error = %e, "rule analysis failed");
                Ok(verdict(rule, ComplianceStatus::Error, vec![format!("Error occurred during analysis: {}", e)]))
            }
        }
    }
}

fn verdict(rule: &Rule, status: ComplianceStatus, suggestions: Vec<String>) -> RuleVerdict {
    RuleVerdict {
        rule_id: rule.id.clone(),
        rule_title: rule.title.clone(),
        status,
        confidence: 0.0,
        evidence: vec![],
        suggestions,
        retrieved_content: vec![],
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn provenance(results: &[RetrievedChunk]) -> Vec<RetrievedContent> {
    results
        .iter()
        .map(|r| RetrievedContent {
            excerpt: excerpt(&r.chunk.text),
            source_document: r.chunk.source_document.clone(),
            similarity: r.similarity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpts_are_cut_on_char_boundaries() {
        let short = "é".repeat(EXCERPT_CHARS);
        assert_eq!(excerpt(&short), short);
        let long = "é".repeat(EXCERPT_CHARS + 1);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 3);
    }
}
