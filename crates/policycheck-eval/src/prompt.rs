use policycheck_core::types::{JudgePrompt, RetrievedChunk, Rule};

/// Rule title followed by its keywords, space-joined.
pub fn retrieval_query(rule: &Rule) -> String {
    std::iter::once(rule.title.as_str()).chain(rule.keywords.iter().map(String::as_str)).collect::<Vec<_>>().join(" ")
}

/// Chunk texts in ranked order separated by a blank line.
pub fn context(results: &[RetrievedChunk]) -> String {
    results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

pub fn judge_prompt(rule: &Rule, context: String) -> JudgePrompt {
    let keywords = rule.keywords.join(", ");
    let text = format!(
        r#"You are a compliance expert analyzing company policy documents.

Rule to Check:
Title: {title}
Description: {description}
Keywords: {keywords}

Policy Documents Context:
{context}

Analyze whether the policy documents comply with this rule. Provide:
1. Compliance status (COMPLIANT, PARTIAL, NON_COMPLIANT, or NOT_ADDRESSED)
2. Confidence score (0.0 to 1.0)
3. Specific evidence from the documents (quote relevant sections)
4. Suggestions for improvement if non-compliant

Respond in this exact JSON format:
{{
    "compliance_status": "COMPLIANT/PARTIAL/NON_COMPLIANT/NOT_ADDRESSED",
    "confidence": 0.0,
    "evidence": ["quote1", "quote2"],
    "suggestions": ["suggestion1", "suggestion2"]
}}
"#,
        title = rule.title,
        description = rule.description,
        keywords = keywords,
        context = context,
    );
    JudgePrompt {
        rule_id: rule.id.clone(),
        rule_title: rule.title.clone(),
        keywords: rule.keywords.clone(),
        context,
        text,
    }
}
