//! The journey query interface: resolve a query to a range, aggregate, and
//! derive the summary payload.

use chrono::{DateTime, Utc};
use journey_core::{Config, DateRange, JourneyData};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregator;
use crate::error::{AggregatorError, Result};
use crate::git_log::GitLogReader;
use crate::jsonl::JsonlCaptureStore;
use crate::sources::{CaptureStore, CommitLogReader};
use crate::summary::{journey_stats, milestones, project_summaries};

/// Longest look-back a query may request.
pub const MAX_QUERY_DAYS: u32 = 3650;

/// What to load: a look-back in days or an explicit range, plus an optional
/// source filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl JourneyQuery {
    #[must_use]
    pub fn last_days(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn between(range: DateRange) -> Self {
        Self {
            date_range: Some(range),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources
            .into_iter()
            .map(Into::into)
            .map(|s: String| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// The range this query covers at `now`. An explicit range wins; a
    /// zero or missing `days` uses `default_days`.
    pub fn resolve_range(&self, now: DateTime<Utc>, default_days: u32) -> Result<DateRange> {
        if let Some(range) = self.date_range {
            return Ok(range);
        }
        let days = self.days.filter(|d| *d > 0).unwrap_or(default_days).max(1);
        if days > MAX_QUERY_DAYS {
            return Err(AggregatorError::InvalidQuery(format!(
                "days must be at most {MAX_QUERY_DAYS}, got {days}"
            )));
        }
        Ok(DateRange::last_days(now, days))
    }
}

/// Aggregator plus the defaults needed to answer [`JourneyQuery`]s.
pub struct JourneyService<C, L> {
    aggregator: Aggregator<C, L>,
    default_days: u32,
}

impl JourneyService<JsonlCaptureStore, GitLogReader> {
    /// Service over the configured capture file and repository.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let aggregator = Aggregator::new(
            JsonlCaptureStore::new(&config.captures_path),
            GitLogReader::new(&config.repo_path),
        )
        .with_commit_source(config.commit_source.clone());
        Self::new(aggregator, config.default_days)
    }
}

impl<C: CaptureStore, L: CommitLogReader> JourneyService<C, L> {
    pub const fn new(aggregator: Aggregator<C, L>, default_days: u32) -> Self {
        Self {
            aggregator,
            default_days,
        }
    }

    #[must_use]
    pub const fn aggregator(&self) -> &Aggregator<C, L> {
        &self.aggregator
    }

    pub fn journey(&self, query: &JourneyQuery) -> Result<JourneyData> {
        self.journey_at(query, Utc::now())
    }

    /// Answer `query` as of `now`.
    pub fn journey_at(&self, query: &JourneyQuery, now: DateTime<Utc>) -> Result<JourneyData> {
        let date_range = query.resolve_range(now, self.default_days)?;
        let events = self.aggregator.aggregate(&date_range, &query.sources)?;
        let projects = project_summaries(&events);
        let stats = journey_stats(&events, &projects);
        let milestones = milestones(&events);
        tracing::debug!(
            events = events.len(),
            projects = projects.len(),
            milestones = milestones.len(),
            "journey query answered"
        );
        Ok(JourneyData {
            events,
            date_range,
            projects,
            stats,
            milestones,
        })
    }
}
