//! Gemini `generateContent` client.
//!
//! The call is async `reqwest` driven to completion on a private
//! current-thread runtime, so callers stay synchronous.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use policycheck_core::config::JudgeSettings;
use policycheck_core::traits::Judge;
use policycheck_core::types::JudgePrompt;
use policycheck_core::{Error, JudgeError, Result};

const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, `None` when blank.
    pub(crate) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

pub struct GeminiJudge {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiJudge {
    pub fn new(settings: &JudgeSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig("judge.api_key is not set (APP_JUDGE__API_KEY or GEMINI_API_KEY)".into()))?;
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build runtime: {}", e)))?;
        let url = format!("{}/models/{}:generateContent", settings.endpoint.trim_end_matches('/'), settings.model);
        Ok(Self { client, runtime, url, api_key, timeout })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, JudgeError> {
        let body = GenerateRequest {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };
        let resp = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(JudgeError::Unavailable(format!("HTTP {}: {}", status, body)));
        }
        let parsed: GenerateResponse = resp.json().await.map_err(|e| self.classify(e))?;
        parsed.text().ok_or(JudgeError::EmptyResponse)
    }

    fn classify(&self, e: reqwest::Error) -> JudgeError {
        if e.is_timeout() {
            JudgeError::Timeout(self.timeout)
        } else {
            JudgeError::Unavailable(e.to_string())
        }
    }
}

impl Judge for GeminiJudge {
    fn name(&self) -> &str {
        "gemini"
    }

    fn judge(&self, prompt: &JudgePrompt) -> std::result::Result<String, JudgeError> {
        debug!(rule = %prompt.rule_id, chars = prompt.text.len(), "calling Gemini");
        self.runtime.block_on(self.generate(&prompt.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_config_error() {
        let settings = JudgeSettings { api_key: Some("  ".into()), ..JudgeSettings::default() };
        assert!(matches!(GeminiJudge::new(&settings), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn url_targets_the_configured_model() {
        let settings = JudgeSettings {
            api_key: Some("key".into()),
            endpoint: "https://example.test/v1beta/".into(),
            ..JudgeSettings::default()
        };
        let judge = GeminiJudge::new(&settings).unwrap();
        assert_eq!(judge.url(), "https://example.test/v1beta/models/gemini-2.5-flash:generateContent");
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"```json\n"},{"text":"{}\n```"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.text().as_deref(), Some("```json\n{}\n```"));
    }

    #[test]
    fn blank_or_missing_candidates_have_no_text() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(resp.text().is_none());
        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn unreachable_endpoint_is_unavailable() {
        let settings = JudgeSettings {
            api_key: Some("key".into()),
            endpoint: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..JudgeSettings::default()
        };
        let judge = GeminiJudge::new(&settings).unwrap();
        let prompt = JudgePrompt {
            rule_id: "r".into(),
            rule_title: "R".into(),
            keywords: vec![],
            context: String::new(),
            text: "hello".into(),
        };
        let err = judge.judge(&prompt).unwrap_err();
        assert!(matches!(err, JudgeError::Unavailable(_) | JudgeError::Timeout(_)));
    }
}
