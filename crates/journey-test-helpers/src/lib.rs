//! Shared test helpers for the journey workspace.
//!
//! - [`TestRepo`]: a throwaway git repository with commits at chosen times
//! - [`CaptureFile`]: a JSON-lines capture store on disk
//! - event builders anchored at a fixed [`base_time`]
//! - [`strategies`]: proptest generators for sorted event lists

#![forbid(unsafe_code)]
#![allow(clippy::missing_panics_doc)]

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};
use journey_core::{EventType, Importance, TimelineEvent};
use tempfile::TempDir;

// =============================================================================
// Time anchors
// =============================================================================

/// Fixed anchor for fixtures: 2025-06-01T09:00:00Z.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// `base_time()` shifted by whole seconds.
#[must_use]
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(offset_secs)
}

// =============================================================================
// Event builders
// =============================================================================

/// A low-importance capture event `offset_secs` after [`base_time`].
#[must_use]
pub fn capture_event(source: &str, offset_secs: i64, content: &str) -> TimelineEvent {
    TimelineEvent::new(
        at(offset_secs),
        source,
        content,
        EventType::Capture,
        Importance::Low,
    )
}

/// One capture per `(source, offset)` pair, sorted by timestamp.
#[must_use]
pub fn events_at(points: &[(&str, i64)]) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = points
        .iter()
        .enumerate()
        .map(|(i, (source, offset))| capture_event(source, *offset, &format!("event {i}")))
        .collect();
    events.sort_by_key(|e| e.timestamp);
    events
}

/// `count` events cycling through `sources`, spaced `step_secs` apart.
#[must_use]
pub fn evenly_spaced(sources: &[&str], count: usize, step_secs: i64) -> Vec<TimelineEvent> {
    (0..count)
        .map(|i| {
            let source = sources[i % sources.len().max(1)];
            let offset = i64::try_from(i).unwrap_or(i64::MAX).saturating_mul(step_secs);
            capture_event(source, offset, &format!("{source} #{i}"))
        })
        .collect()
}

// =============================================================================
// Git repositories
// =============================================================================

/// A temporary git repository whose commits carry explicit author times.
pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    /// Create an empty repository inside a directory named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("journey-repo-")
            .tempdir()
            .expect("tempdir");
        let root = dir.path().join(name);
        fs::create_dir_all(&root).expect("create repo dir");
        let repo = Repository::init(&root).expect("git init");
        Self { dir, repo }
    }

    /// Repository working directory.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.repo
            .workdir()
            .map_or_else(|| self.dir.path().to_path_buf(), Path::to_path_buf)
    }

    #[must_use]
    pub const fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Commit `files` (path, contents) on top of HEAD, authored at
    /// `epoch_secs`, and return the new commit id.
    pub fn commit_at(&self, message: &str, epoch_secs: i64, files: &[(&str, &str)]) -> Oid {
        let sig = Signature::new("Journey Tester", "tester@example.com", &Time::new(epoch_secs, 0))
            .expect("signature");
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .and_then(|oid| self.repo.find_commit(oid).ok());
        let base_tree = parent.as_ref().and_then(|p| p.tree().ok());

        let mut builder = self.repo.treebuilder(base_tree.as_ref()).expect("treebuilder");
        for (name, contents) in files {
            let blob = self.repo.blob(contents.as_bytes()).expect("blob");
            builder.insert(name, blob, 0o100_644).expect("tree insert");
        }
        let tree_oid = builder.write().expect("tree write");
        let tree = self.repo.find_tree(tree_oid).expect("find tree");

        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit");
        tracing::debug!(%oid, epoch_secs, "test repo commit");
        oid
    }

    /// Commit touching a single generated file.
    pub fn commit_simple(&self, message: &str, at: DateTime<Utc>) -> Oid {
        let name = format!("f{}.txt", at.timestamp());
        self.commit_at(message, at.timestamp(), &[(&name, message)])
    }
}

// =============================================================================
// Capture files
// =============================================================================

/// A JSON-lines capture file in a temporary directory.
pub struct CaptureFile {
    _dir: TempDir,
    path: PathBuf,
}

impl Default for CaptureFile {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureFile {
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("captures.jsonl");
        fs::write(&path, "").expect("create capture file");
        Self { _dir: dir, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one well-formed capture record. `tags` is written in the
    /// comma-separated form the capture tool produces.
    pub fn push(&self, at: DateTime<Utc>, source: &str, content: &str, tags: &str) -> &Self {
        let record = serde_json::json!({
            "timestamp": at.to_rfc3339(),
            "content": content,
            "project": source,
            "tags": tags,
        });
        self.push_raw(&record.to_string())
    }

    /// Append an arbitrary line (used to inject malformed records).
    pub fn push_raw(&self, line: &str) -> &Self {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .expect("open capture file");
        writeln!(file, "{line}").expect("append capture line");
        self
    }
}

// =============================================================================
// Proptest strategies
// =============================================================================

pub mod strategies {
    use super::{TimelineEvent, capture_event};
    use proptest::prelude::*;

    /// A small set of source names so lanes collide.
    pub fn source_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["alpha", "beta", "gamma", "delta", "epsilon"])
            .prop_map(str::to_string)
    }

    /// Sorted events with offsets in `0..span_secs` seconds after the anchor.
    pub fn sorted_events(
        max_len: usize,
        span_secs: i64,
    ) -> impl Strategy<Value = Vec<TimelineEvent>> {
        prop::collection::vec((source_name(), 0..span_secs.max(1)), 0..=max_len).prop_map(
            |mut pairs| {
                pairs.sort_by_key(|(_, offset)| *offset);
                pairs
                    .iter()
                    .enumerate()
                    .map(|(i, (source, offset))| {
                        capture_event(source, *offset, &format!("generated {i}"))
                    })
                    .collect()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_commits_carry_author_time() {
        let repo = TestRepo::new("uroboro");
        let oid = repo.commit_at("feat: first", 1_700_000_000, &[("a.txt", "a")]);
        let commit = repo.repo().find_commit(oid).unwrap();
        assert_eq!(commit.author().when().seconds(), 1_700_000_000);
        assert!(repo.path().ends_with("uroboro"));

        let second = repo.commit_simple("fix: second", at(60));
        let commit = repo.repo().find_commit(second).unwrap();
        assert_eq!(commit.parent_count(), 1);
    }

    #[test]
    fn capture_file_appends_lines() {
        let file = CaptureFile::new();
        file.push(at(0), "p", "hello", "a, b").push_raw("{broken");
        let text = fs::read_to_string(file.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"project\":\"p\""));
    }

    #[test]
    fn evenly_spaced_cycles_sources() {
        let events = evenly_spaced(&["a", "b"], 4, 30);
        let sources: Vec<_> = events.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, ["a", "b", "a", "b"]);
        assert_eq!(events[3].timestamp, at(90));
    }
}
