//! Error types for the journey timeline
//!
//! Collaborator read failures are the only hard errors in the system; the
//! viewport, windowing and overlay layers clamp instead of failing.

use thiserror::Error;

/// Result type alias for journey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for journey operations
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ==========================================================================
    // Collaborator Read Errors
    // ==========================================================================
    #[error("Capture store read failed: {0}")]
    CaptureRead(String),

    #[error("Commit log read failed: {0}")]
    CommitLogRead(String),

    #[error("Git error: {0}")]
    Git(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ==========================================================================
    // Internal Errors
    // ==========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::CaptureRead(_) | Self::CommitLogRead(_) => "READ_ERROR",
            Self::Io(_) => "OS_ERROR",
            Self::Serialization(_) => "TYPE_ERROR",
            Self::Git(_) | Self::Internal(_) => "UNHANDLED_EXCEPTION",
        }
    }

    /// Returns whether the error is recoverable (can be retried)
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::CaptureRead(_)
                | Self::CommitLogRead(_)
                | Self::Serialization(_)
        )
    }
}
