//! End-to-end aggregation over a real capture file and git repository.

use journey_aggregator::{
    Aggregator, GitLogReader, JourneyQuery, JourneyService, JsonlCaptureStore, TextCommitLog,
};
use journey_core::{DateRange, EventType, Importance};
use journey_test_helpers::{CaptureFile, TestRepo, at};

#[test]
fn captures_and_commits_merge_into_one_journey() {
    let repo = TestRepo::new("uroboro");
    let feat = repo.commit_at("feat: timeline lanes", at(120).timestamp(), &[("lanes.rs", "x")]);
    repo.commit_at("fix: cluster overlap", at(240).timestamp(), &[("window.rs", "y")]);

    let captures = CaptureFile::new();
    captures
        .push(at(0), "uroboro", "Planning the lane allocator", "planning")
        .push(at(180), "uroboro", &format!("Reviewed {}", &feat.to_string()[..7]), "")
        .push_raw("{\"timestamp\": 12}")
        .push(at(300), "wherewasi", "Big milestone reached", "milestone");

    let aggregator = Aggregator::new(
        JsonlCaptureStore::new(captures.path()),
        GitLogReader::new(repo.path()),
    );
    let service = JourneyService::new(aggregator, 7);
    let data = service
        .journey_at(&JourneyQuery::between(DateRange::new(at(0), at(600))), at(600))
        .unwrap();

    assert_eq!(data.events.len(), 5);
    assert!(data.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let kinds: Vec<_> = data.events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        [
            EventType::Capture,
            EventType::Commit,
            EventType::Capture,
            EventType::Commit,
            EventType::Milestone,
        ]
    );

    // Commits are attributed to the repository directory.
    assert_eq!(data.events[1].source, "uroboro");
    assert_eq!(data.events[1].importance, Importance::High);
    assert_eq!(data.events[3].importance, Importance::Medium);

    // The review capture links to the commit it names.
    assert!(data.events[2].related_ids.contains(&data.events[1].id));
    assert!(data.events[1].related_ids.contains(&data.events[2].id));

    assert_eq!(data.projects[0].name, "uroboro");
    assert_eq!(data.projects[0].event_count, 4);
    assert_eq!(data.stats.total_events, 5);
    assert_eq!(data.milestones.len(), 2);

    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["events"][1]["eventType"], "commit");
    assert_eq!(json["events"][1]["commitHash"], feat.to_string());
    assert!(json["events"][1]["filesChanged"].is_array());
    assert_eq!(json["stats"]["totalEvents"], 5);
    assert!(json["dateRange"]["start"].is_string());
}

#[test]
fn text_commit_log_feeds_the_same_pipeline() {
    let start = at(0).timestamp();
    let text = format!(
        "1111111aaaa|feat!: rewrite viewport|{start}|dev\nnot a line\n2222222bbbb|docs: notes|{}|dev\n",
        start + 60
    );
    let log = TextCommitLog::parse(&text);
    assert_eq!(log.len(), 2);

    let store = journey_aggregator::MemoryCaptureStore::default();
    let aggregator = Aggregator::new(store, log).with_commit_source(Some("journey".into()));
    let events = aggregator
        .aggregate(&DateRange::new(at(0), at(60)), &[])
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].importance, Importance::High);
    assert_eq!(events[1].importance, Importance::Low);
    assert!(events.iter().all(|e| e.source == "journey"));
}

#[test]
fn from_config_reads_configured_paths() {
    let repo = TestRepo::new("configured");
    repo.commit_simple("feat: one", at(0));
    let captures = CaptureFile::new();
    captures.push(at(10), "notes", "hello", "");

    let config = journey_core::Config {
        captures_path: captures.path().to_path_buf(),
        repo_path: repo.path(),
        commit_source: Some("journey".to_string()),
        ..journey_core::Config::default()
    };
    let service = JourneyService::from_config(&config);
    let data = service
        .journey_at(&JourneyQuery::last_days(1), at(3600))
        .unwrap();
    let sources: Vec<_> = data.events.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, ["journey", "notes"]);
}
