//! Keyword-driven event classification.
//!
//! Captures are typed from their tags and content (case-insensitive, first
//! matching rule wins). Commits are always typed `commit`; their importance
//! comes from the conventional-commit prefix of the subject.

use std::sync::LazyLock;

use journey_core::{EventType, Importance};
use regex::Regex;

struct Rule {
    event_type: EventType,
    tag_needles: &'static [&'static str],
    content_needles: &'static [&'static str],
}

const CAPTURE_RULES: &[Rule] = &[
    Rule {
        event_type: EventType::Milestone,
        tag_needles: &["milestone"],
        content_needles: &["milestone"],
    },
    Rule {
        event_type: EventType::Learning,
        tag_needles: &["learn"],
        content_needles: &["learned"],
    },
    Rule {
        event_type: EventType::Decision,
        tag_needles: &["decision", "decid"],
        content_needles: &["decided"],
    },
    Rule {
        event_type: EventType::Integration,
        tag_needles: &["integrat"],
        content_needles: &["integrated"],
    },
    Rule {
        event_type: EventType::Bugfix,
        tag_needles: &["bug", "fix"],
        content_needles: &["fixed", "bug"],
    },
    Rule {
        event_type: EventType::Feature,
        tag_needles: &["feature", "implement"],
        content_needles: &["implemented", "feature"],
    },
];

fn lowered(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| t.to_lowercase()).collect()
}

/// Type of a manual capture.
#[must_use]
pub fn classify_capture(content: &str, tags: &[String]) -> EventType {
    let content = content.to_lowercase();
    let tags = lowered(tags);
    CAPTURE_RULES
        .iter()
        .find(|rule| {
            rule.tag_needles
                .iter()
                .any(|needle| tags.iter().any(|t| t.contains(needle)))
                || rule.content_needles.iter().any(|needle| content.contains(needle))
        })
        .map_or(EventType::Capture, |rule| rule.event_type)
}

/// Importance of a manual capture given its already-derived type.
#[must_use]
pub fn capture_importance(content: &str, tags: &[String], event_type: EventType) -> Importance {
    let tags = lowered(tags);
    if content.to_lowercase().contains("critical") || tags.iter().any(|t| t.contains("critical")) {
        return Importance::Critical;
    }
    if event_type == EventType::Milestone || tags.iter().any(|t| t.contains("important")) {
        return Importance::High;
    }
    if matches!(event_type, EventType::Decision | EventType::Integration) {
        return Importance::Medium;
    }
    Importance::Low
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// Conventional-commit kinds recognized as prefixes.
const CONVENTIONAL_KINDS: &[&str] = &[
    "feat", "fix", "refactor", "perf", "docs", "test", "chore", "build", "ci", "style", "revert",
];

static CONVENTIONAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([a-z]+)(\([^)]*\))?(!)?:\s*").expect("conventional prefix regex"));

/// Parsed `kind(scope)!:` prefix of a commit subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalPrefix {
    pub kind: String,
    pub scope: Option<String>,
    pub breaking: bool,
}

#[must_use]
pub fn parse_conventional(subject: &str) -> Option<ConventionalPrefix> {
    let caps = CONVENTIONAL_RE.captures(subject.trim_start())?;
    let kind = caps.get(1)?.as_str().to_lowercase();
    if !CONVENTIONAL_KINDS.contains(&kind.as_str()) {
        return None;
    }
    let scope = caps.get(2).map(|m| {
        m.as_str()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .to_string()
    });
    Some(ConventionalPrefix {
        kind,
        scope: scope.filter(|s| !s.is_empty()),
        breaking: caps.get(3).is_some(),
    })
}

/// Importance of a commit from its subject line.
///
/// A conventional prefix decides when present; free-form subjects fall back
/// to keyword matching.
#[must_use]
pub fn commit_importance(subject: &str) -> Importance {
    if let Some(prefix) = parse_conventional(subject) {
        return match prefix.kind.as_str() {
            "feat" => Importance::High,
            "fix" | "refactor" => Importance::Medium,
            _ => Importance::Low,
        };
    }
    let lower = subject.to_lowercase();
    if lower.contains("feature") {
        Importance::High
    } else if ["fix", "bug", "refactor", "improve"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        Importance::Medium
    } else {
        Importance::Low
    }
}

/// Tags attached to a commit event.
#[must_use]
pub fn commit_tags(subject: &str) -> Vec<String> {
    let mut tags = vec!["git".to_string(), "commit".to_string()];
    if let Some(prefix) = parse_conventional(subject) {
        tags.push(prefix.kind);
    }
    tags
}
