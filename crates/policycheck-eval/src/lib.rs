//! policycheck-eval
//!
//! Per-rule evaluation (retrieve, prompt, judge, parse) and the report
//! aggregator that runs the catalog and persists the result.
pub mod evaluator;
pub mod parser;
pub mod prompt;
pub mod report;

pub use evaluator::Evaluator;
pub use parser::{parse_judge_response, JudgeAnswer};
pub use report::{rating, recommendations, render_summary, Rating, ReportAggregator, ReportStore};
