//! Collaborator contracts: the capture store and the commit-log reader.
//!
//! Both are read-only and opaque to the aggregator. Implementations return
//! raw records; classification happens in [`crate::classify`].

use chrono::{DateTime, Utc};
use journey_core::DateRange;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A manual capture as stored by the capture tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCapture {
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(alias = "project", default, deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(default, deserialize_with = "tags_from_csv_or_list")]
    pub tags: Vec<String>,
}

impl RawCapture {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
        content: impl Into<String>,
        tags: &[&str],
    ) -> Self {
        Self {
            timestamp,
            content: content.into(),
            source: source.into(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// One commit-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    pub hash: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    #[serde(default)]
    pub files_changed: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Captures store tags either as `"a, b"` or as `["a", "b"]`.
fn tags_from_csv_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Csv(String),
        List(Vec<String>),
    }

    Ok(match Option::<Tags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Tags::Csv(csv)) => split_tags(&csv),
        Some(Tags::List(list)) => list,
    })
}

/// Split a comma-separated tag string, trimming each entry and dropping empties.
#[must_use]
pub fn split_tags(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read side of the capture store.
pub trait CaptureStore {
    /// Captures with `range.start <= timestamp <= range.end`. An empty
    /// `sources` slice means every source.
    fn captures_in_range(&self, range: &DateRange, sources: &[String]) -> Result<Vec<RawCapture>>;
}

/// Read side of the version-control log.
pub trait CommitLogReader {
    /// Commits authored within `range` (inclusive). Malformed entries are
    /// skipped by the implementation.
    fn commits_in_range(&self, range: &DateRange) -> Result<Vec<RawCommit>>;

    /// Name of the repository the log belongs to, when known.
    fn repository_name(&self) -> Option<String> {
        None
    }
}

impl<T: CaptureStore + ?Sized> CaptureStore for &T {
    fn captures_in_range(&self, range: &DateRange, sources: &[String]) -> Result<Vec<RawCapture>> {
        (**self).captures_in_range(range, sources)
    }
}

impl<T: CommitLogReader + ?Sized> CommitLogReader for &T {
    fn commits_in_range(&self, range: &DateRange) -> Result<Vec<RawCommit>> {
        (**self).commits_in_range(range)
    }

    fn repository_name(&self) -> Option<String> {
        (**self).repository_name()
    }
}

impl<T: CaptureStore + ?Sized> CaptureStore for Box<T> {
    fn captures_in_range(&self, range: &DateRange, sources: &[String]) -> Result<Vec<RawCapture>> {
        (**self).captures_in_range(range, sources)
    }
}

impl<T: CommitLogReader + ?Sized> CommitLogReader for Box<T> {
    fn commits_in_range(&self, range: &DateRange) -> Result<Vec<RawCommit>> {
        (**self).commits_in_range(range)
    }

    fn repository_name(&self) -> Option<String> {
        (**self).repository_name()
    }
}

pub(crate) fn source_selected(source: &str, sources: &[String]) -> bool {
    sources.is_empty() || sources.iter().any(|s| s == source)
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Capture store over an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct MemoryCaptureStore {
    captures: Vec<RawCapture>,
}

impl MemoryCaptureStore {
    #[must_use]
    pub const fn new(captures: Vec<RawCapture>) -> Self {
        Self { captures }
    }

    pub fn push(&mut self, capture: RawCapture) {
        self.captures.push(capture);
    }
}

impl CaptureStore for MemoryCaptureStore {
    fn captures_in_range(&self, range: &DateRange, sources: &[String]) -> Result<Vec<RawCapture>> {
        Ok(self
            .captures
            .iter()
            .filter(|c| range.contains(c.timestamp) && source_selected(&c.source, sources))
            .cloned()
            .collect())
    }
}

/// Commit log over an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct MemoryCommitLog {
    commits: Vec<RawCommit>,
    repository: Option<String>,
}

impl MemoryCommitLog {
    #[must_use]
    pub const fn new(commits: Vec<RawCommit>) -> Self {
        Self {
            commits,
            repository: None,
        }
    }

    #[must_use]
    pub fn with_repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository = Some(name.into());
        self
    }
}

impl CommitLogReader for MemoryCommitLog {
    fn commits_in_range(&self, range: &DateRange) -> Result<Vec<RawCommit>> {
        Ok(self
            .commits
            .iter()
            .filter(|c| range.contains(c.timestamp))
            .cloned()
            .collect())
    }

    fn repository_name(&self) -> Option<String> {
        self.repository.clone()
    }
}
