//! Event aggregation for the journey timeline.
//!
//! Merges manual captures and commit-log entries into one classified,
//! timestamp-sorted event list and answers [`JourneyQuery`]s with a
//! [`journey_core::JourneyData`] payload.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod git_log;
pub mod jsonl;
pub mod query;
pub mod sources;
pub mod summary;

pub use aggregate::{Aggregator, DEFAULT_COMMIT_SOURCE, capture_to_event, commit_to_event};
pub use error::{AggregatorError, Result};
pub use git_log::{GitLogReader, TextCommitLog, parse_commit_log};
pub use jsonl::JsonlCaptureStore;
pub use query::{JourneyQuery, JourneyService};
pub use sources::{
    CaptureStore, CommitLogReader, MemoryCaptureStore, MemoryCommitLog, RawCapture, RawCommit,
};
pub use summary::{journey_stats, milestones, project_summaries};
