//! Data models for the journey timeline
//!
//! These models define the wire contract of the journey query interface
//! (camelCase JSON) and the read-only event shape every downstream stage of
//! the rendering engine consumes.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Length of an abbreviated commit id.
const SHORT_COMMIT_ID_LEN: usize = 7;

// =============================================================================
// EventId
// =============================================================================

/// Stable identity of a timeline event.
///
/// Derived from the event's timestamp, source, content and commit id, so the
/// same record keeps the same id across data refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl EventId {
    /// Digest the identifying fields of an event.
    #[must_use]
    pub fn derive(
        timestamp: DateTime<Utc>,
        source: &str,
        content: &str,
        commit_id: Option<&str>,
    ) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(timestamp.timestamp_micros().to_le_bytes());
        hasher.update([0]);
        hasher.update(source.as_bytes());
        hasher.update([0]);
        hasher.update(content.as_bytes());
        hasher.update([0]);
        if let Some(commit) = commit_id {
            hasher.update(commit.as_bytes());
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(head))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// =============================================================================
// EventType / Importance
// =============================================================================

/// Classification of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Capture,
    Commit,
    Milestone,
    Learning,
    Decision,
    Integration,
    Bugfix,
    Feature,
}

impl EventType {
    pub const ALL: [Self; 8] = [
        Self::Capture,
        Self::Commit,
        Self::Milestone,
        Self::Learning,
        Self::Decision,
        Self::Integration,
        Self::Bugfix,
        Self::Feature,
    ];

    /// Wire name (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Commit => "commit",
            Self::Milestone => "milestone",
            Self::Learning => "learning",
            Self::Decision => "decision",
            Self::Integration => "integration",
            Self::Bugfix => "bugfix",
            Self::Feature => "feature",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal importance, serialized as its level (1–4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Importance {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Importance {
    /// Numeric level (1 = low … 4 = critical).
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Build from a level, clamping out-of-range values into 1–4.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Critical,
        }
    }
}

impl From<Importance> for u8 {
    fn from(value: Importance) -> Self {
        value.level()
    }
}

impl From<u8> for Importance {
    fn from(value: u8) -> Self {
        Self::from_level(value)
    }
}

// =============================================================================
// DateRange
// =============================================================================

/// A closed time interval. Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    #[must_use]
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// The `days` leading up to (and including) `now`.
    #[must_use]
    pub fn last_days(now: DateTime<Utc>, days: u32) -> Self {
        Self::new(now - Duration::days(i64::from(days)), now)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    #[must_use]
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + self.duration() / 2
    }

    /// Smallest range covering every timestamp, or `None` for no input.
    #[must_use]
    pub fn spanning<I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut iter = timestamps.into_iter();
        let first = iter.next()?;
        let (lo, hi) = iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(Self { start: lo, end: hi })
    }
}

// =============================================================================
// TimelineEvent
// =============================================================================

/// One entry on the journey timeline.
///
/// Constructed by the aggregator and shared read-only afterwards; use the
/// `with_*` builders before the event is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(rename = "project")]
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
    pub event_type: EventType,
    pub importance: Importance,
    #[serde(rename = "commitHash", default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_changed: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub related_ids: BTreeSet<EventId>,
}

impl TimelineEvent {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
        content: impl Into<String>,
        event_type: EventType,
        importance: Importance,
    ) -> Self {
        let source = source.into();
        let content = content.into();
        Self {
            id: EventId::derive(timestamp, &source, &content, None),
            timestamp,
            content,
            source,
            tags: Vec::new(),
            context: serde_json::Map::new(),
            event_type,
            importance,
            commit_id: None,
            files_changed: Vec::new(),
            related_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Attach a commit id; the event id is re-derived to include it.
    #[must_use]
    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Self {
        let commit_id = commit_id.into();
        self.id = EventId::derive(self.timestamp, &self.source, &self.content, Some(&commit_id));
        self.commit_id = Some(commit_id);
        self
    }

    #[must_use]
    pub fn with_files_changed(mut self, files: Vec<String>) -> Self {
        self.files_changed = files;
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_related(mut self, id: EventId) -> Self {
        if id != self.id {
            self.related_ids.insert(id);
        }
        self
    }

    /// Milestone rule: explicit milestone type or importance ≥ high.
    #[must_use]
    pub fn is_milestone(&self) -> bool {
        self.event_type == EventType::Milestone || self.importance >= Importance::High
    }

    /// Abbreviated commit id (first 7 characters). `None` for non-commits
    /// and for ids already shorter than an abbreviation.
    #[must_use]
    pub fn short_commit_id(&self) -> Option<&str> {
        self.commit_id.as_deref()?.get(..SHORT_COMMIT_ID_LEN)
    }

    /// First `max_chars` characters of the content, with an ellipsis when cut.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        let first_line = self.content.lines().next().unwrap_or("");
        let total = first_line.chars().count();
        if total <= max_chars && first_line.len() == self.content.trim_end().len() {
            return first_line.to_string();
        }
        let keep = max_chars.saturating_sub(1).min(total);
        let mut out: String = first_line.chars().take(keep).collect();
        out.push('…');
        out
    }
}

/// Trim tags, drop empties, and remove duplicates while keeping first-seen order.
#[must_use]
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || out.iter().any(|t| t == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

// =============================================================================
// Journey payload
// =============================================================================

/// Per-source summary over the full event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub event_count: usize,
    pub color: String,
    pub start_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Aggregate statistics over the full event list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStats {
    pub total_events: usize,
    pub project_count: usize,
    pub milestone_count: usize,
    /// Mean importance (0.0 for an empty journey).
    pub productivity_score: f64,
    pub learning_moments: usize,
}

/// The complete payload returned by the journey query interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyData {
    pub events: Vec<TimelineEvent>,
    pub date_range: DateRange,
    pub projects: Vec<ProjectSummary>,
    pub stats: JourneyStats,
    pub milestones: Vec<TimelineEvent>,
}
