//! Temporal windowing and overlap clustering.
//!
//! The full event list is sorted by timestamp, so the buffered window is two
//! binary searches. Clustering is a single left-to-right pass.

use std::ops::Range;

use chrono::{DateTime, Utc};
use journey_core::TimelineEvent;
use journey_core::timestamps::{offset_by_secs, seconds_between};

use crate::viewport::Viewport;

/// Indices of `events` whose timestamp lies in
/// `[start - buffer, end + buffer]`, where `buffer = ratio * (end - start)`.
///
/// `events` must be sorted ascending by timestamp.
#[must_use]
pub fn window_range(events: &[TimelineEvent], viewport: &Viewport, buffer_ratio: f64) -> Range<usize> {
    let ratio = if buffer_ratio.is_finite() { buffer_ratio.max(0.0) } else { 0.0 };
    let buffer = viewport.duration_secs() * ratio;
    let lo = offset_by_secs(viewport.start, -buffer);
    let hi = offset_by_secs(viewport.end, buffer);
    let begin = events.partition_point(|e| e.timestamp < lo);
    let end = events.partition_point(|e| e.timestamp <= hi).max(begin);
    begin..end
}

/// Horizontal coordinate of `t` across a drawable width.
///
/// A zero-length viewport projects everything to the middle.
#[must_use]
pub fn project_x(t: DateTime<Utc>, viewport: &Viewport, width: f64) -> f64 {
    let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    let span = viewport.duration_secs();
    if span <= 0.0 {
        return width / 2.0;
    }
    seconds_between(viewport.start, t) / span * width
}

/// Events merged because their markers would overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCluster {
    /// Indices into the full event list, in temporal order.
    pub members: Vec<usize>,
    /// The most recent member.
    pub representative: usize,
    /// Horizontal position of the representative.
    pub x: f64,
    /// Member count packed into the cluster's span.
    pub density: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventCluster {
    fn single(index: usize, event: &TimelineEvent, x: f64) -> Self {
        Self {
            members: vec![index],
            representative: index,
            x,
            density: 1,
            start: event.timestamp,
            end: event.timestamp,
        }
    }

    fn absorb(&mut self, index: usize, event: &TimelineEvent, x: f64) {
        self.members.push(index);
        self.density = self.members.len();
        self.representative = index;
        self.x = x;
        self.end = event.timestamp;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Time between the first and last member, in seconds.
    #[must_use]
    pub fn span_secs(&self) -> f64 {
        seconds_between(self.start, self.end)
    }

    /// Members per second of span; `None` when every member shares one
    /// instant.
    #[must_use]
    pub fn rate(&self) -> Option<f64> {
        let span = self.span_secs();
        #[allow(clippy::cast_precision_loss)]
        (span > 0.0).then(|| self.members.len() as f64 / span)
    }
}

/// Group the events in `range` into clusters.
///
/// Each event is compared with the previous event of the pass: within
/// `min_distance` it joins the current cluster, otherwise it starts a new one.
#[must_use]
pub fn cluster_events(
    events: &[TimelineEvent],
    range: Range<usize>,
    viewport: &Viewport,
    width: f64,
    min_distance: f64,
) -> Vec<EventCluster> {
    let min_distance = if min_distance.is_finite() { min_distance.max(0.0) } else { 0.0 };
    let mut clusters: Vec<EventCluster> = Vec::new();
    let mut previous_x: Option<f64> = None;
    for index in range {
        let Some(event) = events.get(index) else {
            break;
        };
        let x = project_x(event.timestamp, viewport, width);
        match (clusters.last_mut(), previous_x) {
            (Some(current), Some(prev)) if (x - prev).abs() < min_distance => {
                current.absorb(index, event, x);
            }
            _ => clusters.push(EventCluster::single(index, event, x)),
        }
        previous_x = Some(x);
    }
    clusters
}
