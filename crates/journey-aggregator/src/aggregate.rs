//! Merge captures and commits into one sorted, classified event list.

use std::collections::HashMap;

use journey_core::{DateRange, EventId, EventType, TimelineEvent};

use crate::classify::{capture_importance, classify_capture, commit_importance, commit_tags};
use crate::error::{AggregatorError, Result};
use crate::sources::{CaptureStore, CommitLogReader, RawCapture, RawCommit, source_selected};

/// Source name for commits when neither configuration nor the repository
/// provides one.
pub const DEFAULT_COMMIT_SOURCE: &str = "default";

/// Converts collaborator records into [`TimelineEvent`]s.
pub struct Aggregator<C, L> {
    captures: C,
    commits: L,
    commit_source: Option<String>,
}

impl<C: CaptureStore, L: CommitLogReader> Aggregator<C, L> {
    pub const fn new(captures: C, commits: L) -> Self {
        Self {
            captures,
            commits,
            commit_source: None,
        }
    }

    /// Name commit events with `source` instead of the repository name.
    #[must_use]
    pub fn with_commit_source(mut self, source: Option<String>) -> Self {
        self.commit_source = source.filter(|s| !s.trim().is_empty());
        self
    }

    /// Resolved source name for commit events.
    #[must_use]
    pub fn commit_source(&self) -> String {
        self.commit_source
            .clone()
            .or_else(|| self.commits.repository_name())
            .unwrap_or_else(|| DEFAULT_COMMIT_SOURCE.to_string())
    }

    /// Events in `range`, sorted ascending by timestamp.
    ///
    /// Equal timestamps keep input order with captures ahead of commits. An
    /// empty `sources` filter selects everything.
    pub fn aggregate(&self, range: &DateRange, sources: &[String]) -> Result<Vec<TimelineEvent>> {
        let raw_captures = self
            .captures
            .captures_in_range(range, sources)
            .map_err(AggregatorError::capture_read)?;
        let raw_commits = self
            .commits
            .commits_in_range(range)
            .map_err(AggregatorError::commit_log_read)?;

        let commit_source = self.commit_source();
        let include_commits = source_selected(&commit_source, sources);

        let mut events: Vec<TimelineEvent> = raw_captures
            .iter()
            .filter(|c| range.contains(c.timestamp) && source_selected(&c.source, sources))
            .map(capture_to_event)
            .collect();
        let capture_count = events.len();

        if include_commits {
            events.extend(
                raw_commits
                    .iter()
                    .filter(|c| range.contains(c.timestamp))
                    .map(|c| commit_to_event(c, &commit_source)),
            );
        }

        link_related(&mut events);
        events.sort_by_key(|e| e.timestamp);

        tracing::info!(
            captures = capture_count,
            commits = events.len() - capture_count,
            commit_source = %commit_source,
            "journey events aggregated"
        );
        Ok(events)
    }
}

/// Convert a raw capture into a classified event.
#[must_use]
pub fn capture_to_event(capture: &RawCapture) -> TimelineEvent {
    let event_type = classify_capture(&capture.content, &capture.tags);
    let importance = capture_importance(&capture.content, &capture.tags, event_type);
    TimelineEvent::new(
        capture.timestamp,
        capture.source.trim(),
        capture.content.clone(),
        event_type,
        importance,
    )
    .with_tags(&capture.tags)
}

/// Convert a raw commit into a `commit` event attributed to `source`.
#[must_use]
pub fn commit_to_event(commit: &RawCommit, source: &str) -> TimelineEvent {
    TimelineEvent::new(
        commit.timestamp,
        source,
        commit.message.clone(),
        EventType::Commit,
        commit_importance(&commit.message),
    )
    .with_tags(commit_tags(&commit.message))
    .with_commit_id(commit.hash.clone())
    .with_files_changed(commit.files_changed.clone())
    .with_context("author", serde_json::Value::String(commit.author.clone()))
}

/// Link captures that mention a commit id to that commit, in both directions.
fn link_related(events: &mut [TimelineEvent]) {
    let commits: Vec<(usize, EventId, String, String)> = events
        .iter()
        .enumerate()
        .filter_map(|(idx, e)| {
            let short = e.short_commit_id()?.to_lowercase();
            let full = e.commit_id.as_deref()?.to_lowercase();
            Some((idx, e.id, short, full))
        })
        .collect();
    if commits.is_empty() {
        return;
    }

    let mut back_links: HashMap<usize, Vec<EventId>> = HashMap::new();
    for event in events.iter_mut().filter(|e| e.commit_id.is_none()) {
        let content = event.content.to_lowercase();
        let tags: Vec<String> = event.tags.iter().map(|t| t.to_lowercase()).collect();
        for (commit_idx, commit_id, short, full) in &commits {
            let mentioned = content.contains(short.as_str())
                || content.contains(full.as_str())
                || tags.iter().any(|t| t.contains(short.as_str()));
            if mentioned {
                event.related_ids.insert(*commit_id);
                back_links.entry(*commit_idx).or_default().push(event.id);
            }
        }
    }
    for (commit_idx, ids) in back_links {
        events[commit_idx].related_ids.extend(ids);
    }
}
