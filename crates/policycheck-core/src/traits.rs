use std::path::Path;

use crate::error::{JudgeError, Result};
use crate::types::{JudgePrompt, RetrievedChunk};

/// Ranked chunk lookup over a fitted corpus.
pub trait ChunkSearcher: Send + Sync {
    fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>>;
}

/// A generative model that renders a verdict as free text.
pub trait Judge: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;
    fn judge(&self, prompt: &JudgePrompt) -> std::result::Result<String, JudgeError>;
}

/// Fills an empty document directory so an index can be built.
pub trait DocumentProvisioner {
    /// Returns the number of documents written.
    fn provision(&self, dir: &Path) -> Result<usize>;
}
