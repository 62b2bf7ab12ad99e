//! Derived aggregates over the full event list.

use indexmap::IndexMap;
use journey_core::{EventType, JourneyStats, ProjectSummary, TimelineEvent, source_color};

/// One summary per non-empty source, by event count descending (ties by name).
#[must_use]
pub fn project_summaries(events: &[TimelineEvent]) -> Vec<ProjectSummary> {
    let mut by_source: IndexMap<&str, ProjectSummary> = IndexMap::new();
    for event in events {
        let name = event.source.as_str();
        if name.is_empty() {
            continue;
        }
        let summary = by_source.entry(name).or_insert_with(|| ProjectSummary {
            name: name.to_string(),
            event_count: 0,
            color: source_color(name).to_hex(),
            start_date: event.timestamp,
            last_active: event.timestamp,
        });
        summary.event_count += 1;
        summary.start_date = summary.start_date.min(event.timestamp);
        summary.last_active = summary.last_active.max(event.timestamp);
    }
    let mut summaries: Vec<ProjectSummary> = by_source.into_values().collect();
    summaries.sort_by(|a, b| {
        b.event_count
            .cmp(&a.event_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}

fn is_learning_moment(event: &TimelineEvent) -> bool {
    event.event_type == EventType::Learning
        || event.tags.iter().any(|t| {
            t.eq_ignore_ascii_case("learning") || t.eq_ignore_ascii_case("insight")
        })
}

#[must_use]
pub fn journey_stats(events: &[TimelineEvent], projects: &[ProjectSummary]) -> JourneyStats {
    let total_importance: u64 = events
        .iter()
        .map(|e| u64::from(e.importance.level()))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let productivity_score = if events.is_empty() {
        0.0
    } else {
        total_importance as f64 / events.len() as f64
    };
    JourneyStats {
        total_events: events.len(),
        project_count: projects.len(),
        milestone_count: events.iter().filter(|e| e.is_milestone()).count(),
        productivity_score,
        learning_moments: events.iter().filter(|e| is_learning_moment(e)).count(),
    }
}

/// Milestone events in timeline order.
#[must_use]
pub fn milestones(events: &[TimelineEvent]) -> Vec<TimelineEvent> {
    events.iter().filter(|e| e.is_milestone()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::Importance;
    use journey_test_helpers::{at, capture_event};

    fn typed(source: &str, offset: i64, ty: EventType, imp: Importance) -> TimelineEvent {
        TimelineEvent::new(at(offset), source, "x", ty, imp)
    }

    #[test]
    fn summaries_sorted_by_count_then_name() {
        let events = vec![
            capture_event("beta", 0, "a"),
            capture_event("alpha", 10, "b"),
            capture_event("", 15, "anonymous"),
            capture_event("beta", 20, "c"),
            capture_event("gamma", 30, "d"),
        ];
        let summaries = project_summaries(&events);
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["beta", "alpha", "gamma"]);
        assert_eq!(summaries[0].event_count, 2);
        assert_eq!(summaries[0].start_date, at(0));
        assert_eq!(summaries[0].last_active, at(20));
        assert_eq!(summaries[0].color, source_color("beta").to_hex());
    }

    #[test]
    fn stats_over_mixed_events() {
        let events = vec![
            typed("a", 0, EventType::Milestone, Importance::High),
            typed("a", 1, EventType::Learning, Importance::Low),
            typed("b", 2, EventType::Commit, Importance::Critical),
            typed("b", 3, EventType::Capture, Importance::Medium).with_tags(["Insight"]),
        ];
        let projects = project_summaries(&events);
        let stats = journey_stats(&events, &projects);
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.project_count, 2);
        assert_eq!(stats.milestone_count, 2);
        assert_eq!(stats.learning_moments, 2);
        assert!((stats.productivity_score - 2.5).abs() < f64::EPSILON);
        assert_eq!(milestones(&events).len(), 2);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = journey_stats(&[], &[]);
        assert_eq!(stats, JourneyStats::default());
    }
}
