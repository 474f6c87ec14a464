//! Tolerant extraction of a verdict object from judge free text.
//!
//! Models wrap their answer in code fences or prose, so the parser scans for
//! balanced top-level `{ ... }` spans (ignoring braces inside JSON strings)
//! and strictly decodes the first span that forms a valid answer.
use serde::Deserialize;

use policycheck_core::types::ComplianceStatus;
use policycheck_core::{Error, Result};

#[derive(Deserialize)]
struct RawAnswer {
    compliance_status: String,
    confidence: f64,
    evidence: Vec<String>,
    suggestions: Vec<String>,
}

/// A validated judge answer.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeAnswer {
    pub status: ComplianceStatus,
    pub confidence: f32,
    pub evidence: Vec<String>,
    pub suggestions: Vec<String>,
}

impl TryFrom<RawAnswer> for JudgeAnswer {
    type Error = Error;

    fn try_from(raw: RawAnswer) -> Result<Self> {
        let status: ComplianceStatus = raw.compliance_status.parse().map_err(Error::MalformedJudgeResponse)?;
        if !status.is_judge_status() {
            return Err(Error::MalformedJudgeResponse(format!("status {} is not a judge verdict", status)));
        }
        if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
            return Err(Error::MalformedJudgeResponse(format!("confidence {} outside [0, 1]", raw.confidence)));
        }
        Ok(Self { status, confidence: raw.confidence as f32, evidence: raw.evidence, suggestions: raw.suggestions })
    }
}

/// Byte ranges of every balanced top-level object in `text`.
fn object_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    spans
}

pub fn parse_judge_response(text: &str) -> Result<JudgeAnswer> {
    let spans = object_spans(text);
    if spans.is_empty() {
        return Err(Error::MalformedJudgeResponse("no JSON object in response".into()));
    }
    let mut first_error = None;
    for span in spans {
        let attempt = serde_json::from_str::<RawAnswer>(span)
            .map_err(|e| Error::MalformedJudgeResponse(e.to_string()))
            .and_then(JudgeAnswer::try_from);
        match attempt {
            Ok(answer) => return Ok(answer),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| Error::MalformedJudgeResponse("no JSON object in response".into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str =
        r#"{"compliance_status": "COMPLIANT", "confidence": 0.9, "evidence": ["cap of {12} months"], "suggestions": []}"#;

    #[test]
    fn parses_a_bare_object() {
        let a = parse_judge_response(ANSWER).unwrap();
        assert_eq!(a.status, ComplianceStatus::Compliant);
        assert!((a.confidence - 0.9).abs() < 1e-6);
        assert_eq!(a.evidence, vec!["cap of {12} months"]);
    }

    #[test]
    fn tolerates_fences_and_prose() {
        let text = format!("Here is my analysis:\n```json\n{}\n```\nLet me know if {{anything}} else.", ANSWER);
        assert_eq!(parse_judge_response(&text).unwrap().status, ComplianceStatus::Compliant);
    }

    #[test]
    fn skips_objects_that_are_not_answers() {
        let text = format!(r#"Schema: {{"type": "object"}} Answer: {}"#, ANSWER);
        assert_eq!(parse_judge_response(&text).unwrap().status, ComplianceStatus::Compliant);
    }

    #[test]
    fn braces_and_quotes_inside_strings_do_not_split_the_object() {
        let text = r#"{"compliance_status": "partial", "confidence": 0.5, "evidence": ["says \"}\" here"], "suggestions": ["add {x}"]}"#;
        let a = parse_judge_response(text).unwrap();
        assert_eq!(a.status, ComplianceStatus::Partial);
        assert_eq!(a.evidence, vec![r#"says "}" here"#]);
    }

    #[test]
    fn rejects_missing_fields_and_bad_values() {
        for bad in [
            "no json here",
            r#"{"compliance_status": "COMPLIANT", "confidence": 0.9, "evidence": []}"#,
            r#"{"compliance_status": "COMPLIANT", "confidence": 1.5, "evidence": [], "suggestions": []}"#,
            r#"{"compliance_status": "MAYBE", "confidence": 0.5, "evidence": [], "suggestions": []}"#,
            r#"{"compliance_status": "NOT_FOUND", "confidence": 0.5, "evidence": [], "suggestions": []}"#,
            r#"{"compliance_status": "COMPLIANT/PARTIAL", "confidence": 0.0, "evidence": ["quote1"], "suggestions": []}"#,
            "{ unterminated",
        ] {
            assert!(matches!(parse_judge_response(bad), Err(Error::MalformedJudgeResponse(_))), "accepted {}", bad);
        }
    }
}
