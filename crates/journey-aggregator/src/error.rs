//! Aggregator errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Capture store read failed: {0}")]
    CaptureRead(#[source] Box<AggregatorError>),

    #[error("Commit log read failed: {0}")]
    CommitLogRead(#[source] Box<AggregatorError>),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;

impl AggregatorError {
    /// Wrap a capture-store failure (idempotent for already-wrapped errors).
    #[must_use]
    pub fn capture_read(err: Self) -> Self {
        match err {
            Self::CaptureRead(_) => err,
            other => Self::CaptureRead(Box::new(other)),
        }
    }

    /// Wrap a commit-log failure (idempotent for already-wrapped errors).
    #[must_use]
    pub fn commit_log_read(err: Self) -> Self {
        match err {
            Self::CommitLogRead(_) => err,
            other => Self::CommitLogRead(Box::new(other)),
        }
    }
}

impl From<AggregatorError> for journey_core::JourneyError {
    fn from(err: AggregatorError) -> Self {
        match err {
            AggregatorError::Io(e) => Self::Io(e),
            AggregatorError::Json(e) => Self::Serialization(e),
            AggregatorError::Git(e) => Self::Git(e.message().to_string()),
            AggregatorError::CaptureRead(inner) => Self::CaptureRead(inner.to_string()),
            AggregatorError::CommitLogRead(inner) => Self::CommitLogRead(inner.to_string()),
            AggregatorError::InvalidQuery(msg) => Self::InvalidArgument(msg),
            AggregatorError::Unavailable(msg) => Self::Internal(msg),
        }
    }
}
