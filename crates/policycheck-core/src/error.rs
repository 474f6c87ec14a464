use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures raised by a judge backend. Always recovered per rule.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    #[error("judge timed out after {0:?}")]
    Timeout(Duration),

    #[error("judge returned no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot fit an index on an empty corpus")]
    EmptyCorpus,

    #[error("no terms left after vocabulary pruning")]
    EmptyVocabulary,

    #[error("index has not been fitted or loaded")]
    NotFitted,

    #[error("corpus missing: {0}")]
    CorpusMissing(String),

    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error("malformed judge response: {0}")]
    MalformedJudgeResponse(String),
}

impl Error {
    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self::Persistence { path: path.into(), source: source.into() }
    }

    /// Conditions a caller can repair by re-provisioning documents and rebuilding.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CorpusMissing(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
