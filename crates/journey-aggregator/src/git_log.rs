//! Commit-log readers: a git2 revwalk over HEAD and a parser for the
//! `git log --pretty=format:%H|%s|%at|%an` text format.

use std::path::{Path, PathBuf};

use git2::{Repository, Sort};
use journey_core::DateRange;
use journey_core::timestamps::epoch_seconds_to_datetime;

use crate::error::Result;
use crate::sources::{CommitLogReader, RawCommit};

/// Changed paths beyond this many are not listed on a commit event.
const MAX_FILES_PER_COMMIT: usize = 50;

/// The walk ends at the first commit committed this long before the range
/// start. Author times can trail commit times after a rebase.
const HISTORY_SLACK_SECS: i64 = 86_400;

// ---------------------------------------------------------------------------
// git2 reader
// ---------------------------------------------------------------------------

/// Walks the history reachable from HEAD of a local repository.
#[derive(Debug, Clone)]
pub struct GitLogReader {
    repo_path: PathBuf,
    include_files: bool,
}

impl GitLogReader {
    #[must_use]
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            include_files: true,
        }
    }

    /// Skip the per-commit tree diff (faster on large histories).
    #[must_use]
    pub const fn without_files(mut self) -> Self {
        self.include_files = false;
        self
    }

    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn changed_files(repo: &Repository, commit: &git2::Commit<'_>) -> Result<Vec<String>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        Ok(diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .take(MAX_FILES_PER_COMMIT)
            .collect())
    }
}

impl CommitLogReader for GitLogReader {
    fn commits_in_range(&self, range: &DateRange) -> Result<Vec<RawCommit>> {
        let repo = Repository::discover(&self.repo_path)?;

        let mut revwalk = repo.revwalk()?;
        if revwalk.push_head().is_err() {
            // Unborn HEAD: no history yet.
            return Ok(Vec::new());
        }
        revwalk.set_sorting(Sort::TIME)?;

        let stop_before = range.start.timestamp().saturating_sub(HISTORY_SLACK_SECS);
        let mut commits = Vec::new();
        let mut skipped = 0usize;
        for oid_result in revwalk {
            let oid = match oid_result {
                Ok(oid) => oid,
                Err(e) => {
                    // The walk cannot continue past an unreadable ancestor.
                    tracing::debug!(error = %e, "commit history ends at an unreadable entry");
                    break;
                }
            };
            let commit = match repo.find_commit(oid) {
                Ok(commit) => commit,
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(%oid, error = %e, "skipping unreadable commit");
                    continue;
                }
            };
            if commit.time().seconds() < stop_before {
                break;
            }
            let authored_secs = commit.author().when().seconds();
            let Some(timestamp) = epoch_seconds_to_datetime(authored_secs) else {
                tracing::debug!(%oid, authored_secs, "skipping commit with unrepresentable time");
                continue;
            };
            if !range.contains(timestamp) {
                continue;
            }
            let files_changed = if self.include_files {
                Self::changed_files(&repo, &commit).unwrap_or_else(|e| {
                    tracing::debug!(%oid, error = %e, "changed files unavailable");
                    Vec::new()
                })
            } else {
                Vec::new()
            };
            commits.push(RawCommit {
                hash: oid.to_string(),
                message: commit.summary().unwrap_or("").to_string(),
                timestamp,
                author: commit.author().name().unwrap_or("").to_string(),
                files_changed,
            });
        }
        tracing::debug!(
            repo = %self.repo_path.display(),
            count = commits.len(),
            skipped,
            "commit log read"
        );
        Ok(commits)
    }

    fn repository_name(&self) -> Option<String> {
        let repo = Repository::discover(&self.repo_path).ok()?;
        let workdir = repo.workdir()?.to_path_buf();
        let canonical = workdir.canonicalize().unwrap_or(workdir);
        canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Pipe-format text
// ---------------------------------------------------------------------------

/// Parse `hash|subject|epoch|author` lines.
///
/// Lines with fewer than four fields, an empty hash, or a non-integer epoch
/// are skipped. A subject containing `|` is kept intact: the hash is the
/// first field, epoch and author the last two.
#[must_use]
pub fn parse_commit_log(text: &str) -> Vec<RawCommit> {
    let mut commits = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        match parse_commit_line(line) {
            Some(commit) => commits.push(commit),
            None => tracing::debug!(line = idx + 1, "skipping malformed commit log line"),
        }
    }
    commits
}

fn parse_commit_line(line: &str) -> Option<RawCommit> {
    let mut head = line.splitn(2, '|');
    let hash = head.next()?.trim();
    let rest = head.next()?;
    let mut tail = rest.rsplitn(3, '|');
    let author = tail.next()?.trim();
    let epoch = tail.next()?.trim();
    let subject = tail.next()?;
    if hash.is_empty() {
        return None;
    }
    let secs: i64 = epoch.parse().ok()?;
    Some(RawCommit {
        hash: hash.to_string(),
        message: subject.trim().to_string(),
        timestamp: epoch_seconds_to_datetime(secs)?,
        author: author.to_string(),
        files_changed: Vec::new(),
    })
}

/// Commit log backed by captured `git log` pipe-format output.
#[derive(Debug, Clone, Default)]
pub struct TextCommitLog {
    commits: Vec<RawCommit>,
    repository: Option<String>,
}

impl TextCommitLog {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            commits: parse_commit_log(text),
            repository: None,
        }
    }

    #[must_use]
    pub fn with_repository_name(mut self, name: impl Into<String>) -> Self {
        self.repository = Some(name.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

impl CommitLogReader for TextCommitLog {
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

#[cfg(test)]
mod tests {
    use super::*;
    use journey_test_helpers::{TestRepo, at};

    #[test]
    fn parse_skips_malformed_lines() {
        let text = "\
abc123|feat: add lanes|1748768400|Dev
|no hash|1748768400|Dev
def456|bad epoch|yesterday|Dev
short|line
\r
0a1b2c|fix: a|b pipe|1748768460|Dev Two\r
";
        let commits = parse_commit_log(text);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "abc123");
        assert_eq!(commits[0].message, "feat: add lanes");
        assert_eq!(commits[0].timestamp.timestamp(), 1_748_768_400);
        assert_eq!(commits[1].message, "fix: a|b pipe");
        assert_eq!(commits[1].author, "Dev Two");
    }

    #[test]
    fn text_log_filters_range() {
        let log = TextCommitLog::parse("a|one|100|x\nb|two|200|x\nc|three|300|x\n");
        assert_eq!(log.len(), 3);
        let start = epoch_seconds_to_datetime(150).unwrap();
        let end = epoch_seconds_to_datetime(300).unwrap();
        let hits = log.commits_in_range(&DateRange::new(start, end)).unwrap();
        let hashes: Vec<_> = hits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, ["b", "c"]);
    }

    #[test]
    fn git_reader_walks_head_within_range() {
        let repo = TestRepo::new("uroboro");
        repo.commit_at("feat: first", at(0).timestamp(), &[("a.txt", "a")]);
        repo.commit_at("fix: second", at(600).timestamp(), &[("b.txt", "b")]);
        repo.commit_at("chore: later", at(7200).timestamp(), &[("c.txt", "c")]);

        let reader = GitLogReader::new(repo.path());
        let commits = reader
            .commits_in_range(&DateRange::new(at(0), at(3600)))
            .unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&"feat: first"));
        assert!(messages.contains(&"fix: second"));

        let second = commits.iter().find(|c| c.message == "fix: second").unwrap();
        assert_eq!(second.files_changed, vec!["b.txt"]);
        assert_eq!(second.author, "Journey Tester");
        assert_eq!(second.hash.len(), 40);
        assert_eq!(reader.repository_name().as_deref(), Some("uroboro"));
    }

    #[test]
    fn missing_tree_keeps_commit_without_files() {
        let repo = TestRepo::new("partial");
        repo.commit_at("feat: first", at(0).timestamp(), &[("a.txt", "a")]);
        let second = repo.commit_at("fix: second", at(600).timestamp(), &[("b.txt", "b")]);
        let tree = repo.repo().find_commit(second).unwrap().tree_id().to_string();
        let loose = repo.repo().path().join("objects").join(&tree[..2]).join(&tree[2..]);
        std::fs::remove_file(loose).unwrap();

        let commits = GitLogReader::new(repo.path())
            .commits_in_range(&DateRange::new(at(0), at(3600)))
            .unwrap();
        assert_eq!(commits.len(), 2);
        let second = commits.iter().find(|c| c.message == "fix: second").unwrap();
        assert!(second.files_changed.is_empty());
        let first = commits.iter().find(|c| c.message == "feat: first").unwrap();
        assert_eq!(first.files_changed, vec!["a.txt"]);
    }

    #[test]
    fn walk_stops_well_before_range_start() {
        let repo = TestRepo::new("long");
        repo.commit_at("chore: ancient", at(-30 * 86_400).timestamp(), &[("old.txt", "old")]);
        repo.commit_at("feat: recent", at(0).timestamp(), &[("new.txt", "new")]);
        let commits = GitLogReader::new(repo.path())
            .commits_in_range(&DateRange::new(at(-60), at(60)))
            .unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, ["feat: recent"]);
    }

    #[test]
    fn git_reader_on_unborn_head_is_empty() {
        let repo = TestRepo::new("empty");
        let reader = GitLogReader::new(repo.path()).without_files();
        let commits = reader
            .commits_in_range(&DateRange::new(at(0), at(10)))
            .unwrap();
        assert!(commits.is_empty());
    }

    #[test]
    fn git_reader_outside_repository_errors() {
        let dir = tempfile::tempdir().unwrap();
        let reader = GitLogReader::new(dir.path());
        // Temp dirs are not inside a repository on CI machines; if one is,
        // discovery succeeds and the call is still well-formed.
        let result = reader.commits_in_range(&DateRange::new(at(0), at(10)));
        if Repository::discover(dir.path()).is_err() {
            assert!(result.is_err());
        }
    }
}
