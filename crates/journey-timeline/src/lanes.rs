//! Per-source lane allocation over the windowed event set.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use journey_core::TimelineEvent;

/// A vertical track assigned to one event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLane {
    pub source: String,
    pub lane_index: usize,
    /// Position of the source's first event within the windowed slice.
    pub first_seen_index: usize,
    pub last_seen_index: usize,
    pub event_count: usize,
    /// Lane 0: the most frequent source in the window.
    pub is_base: bool,
}

/// Assign lanes for a windowed, time-sorted slice.
///
/// The source with the most events takes lane 0 (ties go to the earliest
/// first appearance). The others follow in order of first appearance.
#[must_use]
pub fn allocate_lanes(windowed: &[TimelineEvent]) -> Vec<SourceLane> {
    let mut by_source: HashMap<&str, usize> = HashMap::new();
    let mut lanes: Vec<SourceLane> = Vec::new();
    for (idx, event) in windowed.iter().enumerate() {
        let slot = *by_source.entry(event.source.as_str()).or_insert_with(|| {
            lanes.push(SourceLane {
                source: event.source.clone(),
                lane_index: 0,
                first_seen_index: idx,
                last_seen_index: idx,
                event_count: 0,
                is_base: false,
            });
            lanes.len() - 1
        });
        let lane = &mut lanes[slot];
        lane.last_seen_index = idx;
        lane.event_count += 1;
    }

    // `lanes` is in first-appearance order; pick the base, keep the rest.
    let base = lanes
        .iter()
        .enumerate()
        .fold(None::<(usize, usize)>, |best, (slot, lane)| match best {
            Some((_, count)) if count >= lane.event_count => best,
            _ => Some((slot, lane.event_count)),
        })
        .map(|(slot, _)| slot);
    if let Some(slot) = base {
        let mut base_lane = lanes.remove(slot);
        base_lane.is_base = true;
        lanes.insert(0, base_lane);
    }
    for (index, lane) in lanes.iter_mut().enumerate() {
        lane.lane_index = index;
    }
    lanes
}

/// Pixel height per lane: the available height split evenly, clamped to
/// `[min, max]`.
#[must_use]
pub fn lane_height(lane_count: usize, available: f64, min: f64, max: f64) -> f64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    if lane_count == 0 || !available.is_finite() {
        return max;
    }
    #[allow(clippy::cast_precision_loss)]
    let even = available.max(0.0) / lane_count as f64;
    even.clamp(min, max)
}

/// Fingerprint of a windowed set's composition: the ordered event ids.
#[must_use]
pub fn composition_fingerprint(windowed: &[TimelineEvent]) -> u64 {
    let mut hasher = DefaultHasher::new();
    windowed.len().hash(&mut hasher);
    for event in windowed {
        event.id.hash(&mut hasher);
    }
    hasher.finish()
}

/// Lane assignment memoized on the windowed set's composition.
#[derive(Debug, Default)]
pub struct LaneAllocator {
    fingerprint: Option<u64>,
    lanes: Vec<SourceLane>,
    recomputes: u64,
}

impl LaneAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute when the composition changed. Returns whether it did.
    pub fn update(&mut self, windowed: &[TimelineEvent]) -> bool {
        let fingerprint = composition_fingerprint(windowed);
        if self.fingerprint == Some(fingerprint) {
            return false;
        }
        self.lanes = allocate_lanes(windowed);
        self.fingerprint = Some(fingerprint);
        self.recomputes += 1;
        tracing::debug!(
            events = windowed.len(),
            lanes = self.lanes.len(),
            recomputes = self.recomputes,
            "lanes recomputed"
        );
        true
    }

    /// Forget the memoized composition so the next update recomputes.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }

    #[must_use]
    pub fn lanes(&self) -> &[SourceLane] {
        &self.lanes
    }

    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    #[must_use]
    pub fn lane_of(&self, source: &str) -> Option<usize> {
        self.lanes
            .iter()
            .find(|lane| lane.source == source)
            .map(|lane| lane.lane_index)
    }

    /// Number of recomputations so far.
    #[must_use]
    pub const fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
