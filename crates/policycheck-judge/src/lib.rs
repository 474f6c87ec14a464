//! policycheck-judge
//!
//! `Judge` backends: the Gemini `generateContent` client and an offline
//! keyword-coverage judge. `APP_USE_FAKE_JUDGE=1` forces the offline judge.
use tracing::info;

use policycheck_core::config::{JudgeProvider, JudgeSettings};
use policycheck_core::traits::Judge;
use policycheck_core::Result;

pub mod gemini;
pub mod heuristic;

pub use gemini::GeminiJudge;
pub use heuristic::HeuristicJudge;

pub fn default_judge(settings: &JudgeSettings) -> Result<Box<dyn Judge>> {
    let use_fake = std::env::var("APP_USE_FAKE_JUDGE").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if use_fake || settings.provider == JudgeProvider::Offline {
        info!("using offline heuristic judge");
        return Ok(Box::new(HeuristicJudge::new()));
    }
    let judge = GeminiJudge::new(settings)?;
    info!(model = %settings.model, "using Gemini judge");
    Ok(Box::new(judge))
}
