//! Hit-test zones over rendered markers, tooltips, selection and keyboard
//! focus.
//!
//! Zones are rebuilt wholesale from the same placements the renderer uses
//! and stamped with an epoch. A zone whose event no longer matches the
//! event list is ignored.

use journey_core::{EventId, TimelineEvent};

use crate::config::TimelineConfig;
use crate::layout::SurfaceMetrics;
use crate::render::{RenderInput, place_markers};

/// Tags shown in a tooltip.
const TOOLTIP_TAGS: usize = 3;
/// Content excerpt length in a tooltip.
const TOOLTIP_EXCERPT_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionZone {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Representative event of the marker.
    pub event: EventId,
    /// Index of the representative in the full event list.
    pub event_index: usize,
    pub member_count: usize,
    pub members: Vec<EventId>,
    /// Generation this zone belongs to.
    pub epoch: u64,
}

impl InteractionZone {
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Zones for every placed marker, at least `min_hit_size` on each side and
/// clipped to the plot area.
#[must_use]
pub fn build_zones(input: &RenderInput<'_>, epoch: u64) -> Vec<InteractionZone> {
    let layout = input.layout;
    let min_size = if input.config.min_hit_size.is_finite() {
        input.config.min_hit_size.max(0.0)
    } else {
        0.0
    };
    let mut zones = Vec::new();
    for placement in place_markers(input) {
        let Some(cluster) = input.clusters.get(placement.cluster) else {
            continue;
        };
        let Some(event) = input.events.get(placement.event) else {
            continue;
        };
        let size = (placement.radius * 2.0).max(min_size);
        let left = (placement.center.x - size / 2.0).max(layout.plot_left());
        let right = (placement.center.x + size / 2.0).min(layout.surface.width);
        if right <= left {
            continue;
        }
        zones.push(InteractionZone {
            x: left,
            y: placement.center.y - size / 2.0,
            width: right - left,
            height: size,
            event: event.id,
            event_index: placement.event,
            member_count: cluster.len(),
            members: cluster
                .members
                .iter()
                .filter_map(|&i| input.events.get(i).map(|e| e.id))
                .collect(),
            epoch,
        });
    }
    zones
}

/// Hover card contents and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub event: EventId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source: String,
    pub timestamp: String,
    pub excerpt: String,
    pub tags: Vec<String>,
}

impl Tooltip {
    /// Text rows in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        let mut rows: Vec<String> = vec![self.source.clone(), self.timestamp.clone(), self.excerpt.clone()];
        if !self.tags.is_empty() {
            rows.push(
                self.tags
                    .iter()
                    .map(|t| format!("#{t}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }
        rows
    }

    fn build(
        event: &TimelineEvent,
        pointer: (f64, f64),
        surface: &SurfaceMetrics,
        config: &TimelineConfig,
    ) -> Self {
        let mut tip = Self {
            event: event.id,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            source: event.source.clone(),
            timestamp: event.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            excerpt: event.excerpt(TOOLTIP_EXCERPT_CHARS),
            tags: event.tags.iter().take(TOOLTIP_TAGS).cloned().collect(),
        };
        let rows = tip.rows();
        let widest = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        {
            tip.width = (widest as f64 + 2.0) * config.char_width;
            tip.height = rows.len() as f64 * config.line_height;
        }
        tip.width = tip.width.min(surface.width);
        tip.height = tip.height.min(surface.height);

        let (px, py) = pointer;
        let offset = config.tooltip_offset;
        let mut x = px + offset;
        if x + tip.width > surface.width {
            x = px - offset - tip.width;
        }
        let mut y = py + offset;
        if y + tip.height > surface.height {
            y = py - offset - tip.height;
        }
        tip.x = x.clamp(0.0, (surface.width - tip.width).max(0.0));
        tip.y = y.clamp(0.0, (surface.height - tip.height).max(0.0));
        tip
    }
}

/// Emitted on click or keyboard activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The representative event.
    pub event: TimelineEvent,
    /// Every member id when the marker is a cluster.
    pub members: Vec<EventId>,
}

#[derive(Debug, Default)]
pub struct InteractionOverlay {
    zones: Vec<InteractionZone>,
    epoch: u64,
    tooltip: Option<Tooltip>,
    focus: Option<EventId>,
}

impl InteractionOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every zone and build a fresh generation.
    pub fn rebuild(&mut self, input: &RenderInput<'_>) {
        self.epoch += 1;
        self.zones = build_zones(input, self.epoch);
        self.tooltip = None;
        tracing::debug!(epoch = self.epoch, zones = self.zones.len(), "interaction zones rebuilt");
    }

    #[must_use]
    pub fn zones(&self) -> &[InteractionZone] {
        &self.zones
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    #[must_use]
    pub const fn focus(&self) -> Option<EventId> {
        self.focus
    }

    /// Topmost zone under the point.
    #[must_use]
    pub fn zone_at(&self, x: f64, y: f64) -> Option<&InteractionZone> {
        self.zones.iter().rev().find(|z| z.contains(x, y))
    }

    fn resolve<'e>(zone: &InteractionZone, events: &'e [TimelineEvent]) -> Option<&'e TimelineEvent> {
        events.get(zone.event_index).filter(|e| e.id == zone.event)
    }

    /// Show a tooltip for the zone under the pointer, or hide it.
    pub fn hover(
        &mut self,
        x: f64,
        y: f64,
        events: &[TimelineEvent],
        surface: &SurfaceMetrics,
        config: &TimelineConfig,
    ) -> Option<&Tooltip> {
        let event = self.zone_at(x, y).and_then(|zone| Self::resolve(zone, events));
        self.tooltip = event.map(|e| Tooltip::build(e, (x, y), surface, config));
        self.tooltip.as_ref()
    }

    pub fn hover_end(&mut self) {
        self.tooltip = None;
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    fn select(zone: &InteractionZone, events: &[TimelineEvent]) -> Option<Selection> {
        let event = Self::resolve(zone, events)?;
        Some(Selection {
            event: event.clone(),
            members: zone.members.clone(),
        })
    }

    pub fn click(&mut self, x: f64, y: f64, events: &[TimelineEvent]) -> Option<Selection> {
        let selection = Self::select(self.zone_at(x, y)?, events)?;
        self.focus = Some(selection.event.id);
        Some(selection)
    }

    fn focus_index(&self) -> Option<usize> {
        let focus = self.focus?;
        self.zones
            .iter()
            .position(|z| z.event == focus || z.members.contains(&focus))
    }

    /// Move focus to the next zone, wrapping around.
    pub fn focus_next(&mut self) -> Option<EventId> {
        self.step_focus(true)
    }

    /// Move focus to the previous zone, wrapping around.
    pub fn focus_prev(&mut self) -> Option<EventId> {
        self.step_focus(false)
    }

    fn step_focus(&mut self, forward: bool) -> Option<EventId> {
        let len = self.zones.len();
        if len == 0 {
            self.focus = None;
            return None;
        }
        let next = match (self.focus_index(), forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.focus = Some(self.zones[next].event);
        self.focus
    }

    #[must_use]
    pub fn focused_zone(&self) -> Option<&InteractionZone> {
        self.focus_index().map(|i| &self.zones[i])
    }

    /// Select the focused zone.
    #[must_use]
    pub fn activate(&self, events: &[TimelineEvent]) -> Option<Selection> {
        Self::select(self.focused_zone()?, events)
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }
}
