//! Immediate-mode drawing: derived inputs in, a full list of draw commands
//! out. Nothing is retained between frames.
//!
//! Coordinates in a [`DrawList`] are device pixels (logical coordinates
//! times the pixel ratio). Stroke centerlines are aligned with
//! [`SurfaceMetrics::align`].

use std::collections::HashMap;

use journey_core::{EventId, EventType, Rgb, Theme, TimelineEvent, source_color};

use crate::config::TimelineConfig;
use crate::lanes::SourceLane;
use crate::layout::TimelineLayout;
use crate::viewport::Viewport;
use crate::window::EventCluster;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgb,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Text {
        at: Point,
        text: String,
        color: Rgb,
        align: TextAlign,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgb,
    },
    /// Milestone marker.
    Diamond {
        center: Point,
        radius: f64,
        fill: Rgb,
    },
    /// Outline around a marker; dashed for context switches.
    Ring {
        center: Point,
        radius: f64,
        color: Rgb,
        stroke_width: f64,
        dashed: bool,
    },
    /// Keyboard focus indicator.
    FocusRing {
        center: Point,
        radius: f64,
        color: Rgb,
        stroke_width: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        stroke_width: f64,
    },
    /// Quadratic curve between related events.
    Curve {
        from: Point,
        control: Point,
        to: Point,
        color: Rgb,
        stroke_width: f64,
    },
    /// Member count of a cluster.
    Badge {
        center: Point,
        count: usize,
        fill: Rgb,
        text_color: Rgb,
    },
}

/// One frame's worth of commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub pixel_ratio: f64,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Marker commands (circles and diamonds).
    pub fn markers(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. } | DrawCommand::Diamond { .. }))
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// Colors a theme assigns to non-event elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: Rgb,
    pub band_even: Rgb,
    pub band_odd: Rgb,
    pub text: Rgb,
    pub axis: Rgb,
    pub ring: Rgb,
    pub connection: Rgb,
    pub focus: Rgb,
    pub badge: Rgb,
}

impl ThemePalette {
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Default => Self {
                background: Rgb::new(0x1E, 0x1E, 0x2E),
                band_even: Rgb::new(0x24, 0x24, 0x36),
                band_odd: Rgb::new(0x2A, 0x2A, 0x3E),
                text: Rgb::new(0xCD, 0xD6, 0xF4),
                axis: Rgb::new(0x6C, 0x70, 0x86),
                ring: Rgb::new(0xF5, 0xE0, 0xDC),
                connection: Rgb::new(0x89, 0xB4, 0xFA),
                focus: Rgb::new(0xF9, 0xE2, 0xAF),
                badge: Rgb::new(0x31, 0x32, 0x44),
            },
            Theme::Dark => Self {
                background: Rgb::new(0x0D, 0x11, 0x17),
                band_even: Rgb::new(0x16, 0x1B, 0x22),
                band_odd: Rgb::new(0x1C, 0x21, 0x28),
                text: Rgb::new(0xC9, 0xD1, 0xD9),
                axis: Rgb::new(0x48, 0x4F, 0x58),
                ring: Rgb::new(0xE6, 0xED, 0xF3),
                connection: Rgb::new(0x58, 0xA6, 0xFF),
                focus: Rgb::new(0xD2, 0x99, 0x22),
                badge: Rgb::new(0x30, 0x36, 0x3D),
            },
            Theme::Light => Self {
                background: Rgb::new(0xFA, 0xFA, 0xFA),
                band_even: Rgb::new(0xF0, 0xF0, 0xF3),
                band_odd: Rgb::new(0xE6, 0xE6, 0xEB),
                text: Rgb::new(0x24, 0x29, 0x2F),
                axis: Rgb::new(0x8C, 0x95, 0x9F),
                ring: Rgb::new(0x24, 0x29, 0x2F),
                connection: Rgb::new(0x09, 0x69, 0xDA),
                focus: Rgb::new(0xBF, 0x87, 0x00),
                badge: Rgb::new(0xD0, 0xD7, 0xDE),
            },
            Theme::Matrix => Self {
                background: Rgb::new(0x00, 0x00, 0x00),
                band_even: Rgb::new(0x00, 0x14, 0x00),
                band_odd: Rgb::new(0x00, 0x1E, 0x00),
                text: Rgb::new(0x00, 0xFF, 0x41),
                axis: Rgb::new(0x00, 0x8F, 0x11),
                ring: Rgb::new(0x00, 0xFF, 0x41),
                connection: Rgb::new(0x00, 0xB3, 0x2C),
                focus: Rgb::new(0xCC, 0xFF, 0xCC),
                badge: Rgb::new(0x00, 0x3B, 0x00),
            },
            Theme::Neon => Self {
                background: Rgb::new(0x0A, 0x00, 0x14),
                band_even: Rgb::new(0x14, 0x00, 0x28),
                band_odd: Rgb::new(0x1E, 0x00, 0x3C),
                text: Rgb::new(0xFF, 0xFF, 0xFF),
                axis: Rgb::new(0xFF, 0x00, 0xFF),
                ring: Rgb::new(0x00, 0xFF, 0xFF),
                connection: Rgb::new(0xFF, 0x00, 0xFF),
                focus: Rgb::new(0xFF, 0xFF, 0x00),
                badge: Rgb::new(0x2D, 0x00, 0x50),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Marker geometry
// ---------------------------------------------------------------------------

/// Extra radius per importance level above low.
const IMPORTANCE_BONUS: f64 = 0.75;

/// Logical marker radius for `event`, capped so it stays inside its lane.
#[must_use]
pub fn marker_radius(
    event: &TimelineEvent,
    viewport: &Viewport,
    layout: &TimelineLayout,
    config: &TimelineConfig,
) -> f64 {
    let scale = if config.marker_scale.is_finite() { config.marker_scale.max(0.0) } else { 1.0 };
    let bonus = f64::from(event.importance.level().saturating_sub(1)) * IMPORTANCE_BONUS;
    let radius = (viewport.scale.base_marker_radius() + bonus) * scale;
    radius.min(layout.lane_height * 0.45).max(0.0)
}

/// Lane of a source, falling back to lane 0 when lookups miss.
#[must_use]
pub fn lane_for(lanes: &[SourceLane], source: &str) -> usize {
    lanes
        .iter()
        .find(|lane| lane.source == source)
        .map_or(0, |lane| lane.lane_index)
}

/// Where a cluster's marker is drawn, in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub cluster: usize,
    pub event: usize,
    pub lane: usize,
    pub center: Point,
    pub radius: f64,
    pub context_switch: bool,
}

/// Marker placements for every cluster, in render order.
#[must_use]
pub fn place_markers(input: &RenderInput<'_>) -> Vec<MarkerPlacement> {
    let mut placements = Vec::with_capacity(input.clusters.len());
    let mut previous_source: Option<&str> = None;
    for (cluster_idx, cluster) in input.clusters.iter().enumerate() {
        let Some(event) = input.events.get(cluster.representative) else {
            continue;
        };
        let lane = lane_for(input.lanes, &event.source);
        let context_switch = previous_source.is_some_and(|prev| prev != event.source);
        previous_source = Some(event.source.as_str());
        placements.push(MarkerPlacement {
            cluster: cluster_idx,
            event: cluster.representative,
            lane,
            center: Point::new(input.layout.marker_x(cluster.x), input.layout.lane_center_y(lane)),
            radius: marker_radius(event, input.viewport, input.layout, input.config),
            context_switch,
        });
    }
    placements
}

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

/// Everything one frame is derived from.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Full sorted event list; clusters index into it.
    pub events: &'a [TimelineEvent],
    pub clusters: &'a [EventCluster],
    pub lanes: &'a [SourceLane],
    pub viewport: &'a Viewport,
    pub layout: &'a TimelineLayout,
    pub config: &'a TimelineConfig,
    pub focus: Option<EventId>,
}

fn axis_label(input: &RenderInput<'_>, t: chrono::DateTime<chrono::Utc>) -> String {
    let format = if input.viewport.scale.is_sub_day() { "%H:%M" } else { "%Y-%m-%d" };
    t.format(format).to_string()
}

fn fit_label(text: &str, width: f64, char_width: f64) -> String {
    if char_width <= 0.0 || !width.is_finite() {
        return text.to_string();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_chars = (width / char_width).floor().max(0.0) as usize;
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    if max_chars > 0 {
        out.push('…');
    }
    out
}

/// Produce the full draw list for one frame.
#[must_use]
pub fn draw(input: &RenderInput<'_>) -> DrawList {
    let layout = input.layout;
    let m = layout.surface;
    let palette = ThemePalette::for_theme(input.config.theme);
    let mut list = DrawList {
        pixel_ratio: m.pixel_ratio,
        commands: Vec::with_capacity(8 + input.lanes.len() * 2 + input.clusters.len() * 2),
    };

    list.push(DrawCommand::Clear {
        color: palette.background,
    });

    // Lane bands.
    for lane in input.lanes {
        let band = if lane.lane_index % 2 == 0 { palette.band_even } else { palette.band_odd };
        list.push(DrawCommand::FillRect {
            x: m.snap(layout.plot_left()),
            y: m.snap(layout.lane_top(lane.lane_index)),
            width: m.snap(layout.plot_width()),
            height: m.snap(layout.lane_height),
            color: band,
        });
    }

    let placements = place_markers(input);

    // Connections under the markers.
    if input.config.show_connections {
        draw_connections(input, &placements, &palette, &mut list);
    }

    let ring_stroke = m.stroke(1.0);
    for placement in &placements {
        let Some(event) = input.events.get(placement.event) else {
            continue;
        };
        let fill = source_color(&event.source);
        let center = Point::new(m.device(placement.center.x), m.device(placement.center.y));
        let radius = m.device(placement.radius);
        if event.event_type == EventType::Milestone {
            list.push(DrawCommand::Diamond { center, radius, fill });
        } else {
            list.push(DrawCommand::Circle { center, radius, fill });
        }
        if placement.context_switch {
            list.push(DrawCommand::Ring {
                center: Point::new(
                    m.align(placement.center.x, ring_stroke),
                    m.align(placement.center.y, ring_stroke),
                ),
                radius: radius + ring_stroke * 2.0,
                color: palette.ring,
                stroke_width: ring_stroke,
                dashed: true,
            });
        }
        let members = input.clusters.get(placement.cluster).map_or(1, EventCluster::len);
        if members > 1 {
            list.push(DrawCommand::Badge {
                center: Point::new(center.x + radius, center.y - radius),
                count: members,
                fill: palette.badge,
                text_color: palette.text,
            });
        }
        if input.focus.is_some_and(|id| {
            input
                .clusters
                .get(placement.cluster)
                .is_some_and(|c| c.members.iter().any(|&i| input.events.get(i).is_some_and(|e| e.id == id)))
        }) {
            list.push(DrawCommand::FocusRing {
                center: Point::new(
                    m.align(placement.center.x, ring_stroke),
                    m.align(placement.center.y, ring_stroke),
                ),
                radius: radius + ring_stroke * 4.0,
                color: palette.focus,
                stroke_width: ring_stroke,
            });
        }
    }

    // Label column on top of markers that spill out of the plot.
    list.push(DrawCommand::FillRect {
        x: 0.0,
        y: 0.0,
        width: m.snap(layout.label_width),
        height: m.snap(layout.axis_top()),
        color: palette.background,
    });
    let padding = input.config.char_width * 0.5;
    for lane in input.lanes {
        list.push(DrawCommand::Text {
            at: Point::new(
                m.device(padding),
                m.device(layout.lane_center_y(lane.lane_index)),
            ),
            text: fit_label(&lane.source, layout.label_width - padding * 2.0, input.config.char_width),
            color: palette.text,
            align: TextAlign::Left,
        });
    }

    // Time axis.
    let axis_stroke = m.stroke(1.0);
    let axis_y = m.align(layout.axis_top(), axis_stroke);
    list.push(DrawCommand::Line {
        from: Point::new(m.align(layout.plot_left(), axis_stroke), axis_y),
        to: Point::new(m.align(m.width, axis_stroke), axis_y),
        color: palette.axis,
        stroke_width: axis_stroke,
    });
    let label_y = m.device(layout.axis_top() + layout.axis_height / 2.0);
    list.push(DrawCommand::Text {
        at: Point::new(m.device(layout.plot_left()), label_y),
        text: axis_label(input, input.viewport.start),
        color: palette.axis,
        align: TextAlign::Left,
    });
    list.push(DrawCommand::Text {
        at: Point::new(m.device(m.width), label_y),
        text: axis_label(input, input.viewport.end),
        color: palette.axis,
        align: TextAlign::Right,
    });

    list
}

fn draw_connections(
    input: &RenderInput<'_>,
    placements: &[MarkerPlacement],
    palette: &ThemePalette,
    list: &mut DrawList,
) {
    let m = input.layout.surface;
    let mut owner: HashMap<EventId, usize> = HashMap::new();
    for (slot, placement) in placements.iter().enumerate() {
        if let Some(cluster) = input.clusters.get(placement.cluster) {
            for &member in &cluster.members {
                if let Some(event) = input.events.get(member) {
                    owner.insert(event.id, slot);
                }
            }
        }
    }
    let stroke = m.stroke(1.0);
    let lift = input.layout.lane_height * 0.5;
    for (slot, placement) in placements.iter().enumerate() {
        let Some(cluster) = input.clusters.get(placement.cluster) else {
            continue;
        };
        let mut targets: Vec<usize> = cluster
            .members
            .iter()
            .filter_map(|&i| input.events.get(i))
            .flat_map(|e| e.related_ids.iter())
            .filter_map(|id| owner.get(id).copied())
            .filter(|&other| other > slot)
            .collect();
        targets.sort_unstable();
        targets.dedup();
        for other in targets {
            let a = placement.center;
            let b = placements[other].center;
            let control = Point::new((a.x + b.x) / 2.0, (a.y.min(b.y) - lift).max(0.0));
            list.push(DrawCommand::Curve {
                from: Point::new(m.align(a.x, stroke), m.align(a.y, stroke)),
                control: Point::new(m.device(control.x), m.device(control.y)),
                to: Point::new(m.align(b.x, stroke), m.align(b.y, stroke)),
                color: palette.connection,
                stroke_width: stroke,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::allocate_lanes;
    use crate::layout::SurfaceMetrics;
    use crate::scale::Scale;
    use crate::window::{cluster_events, window_range};
    use journey_core::{EventType, Importance};
    use journey_test_helpers::{at, capture_event, events_at};

    struct Fixture {
        events: Vec<TimelineEvent>,
        clusters: Vec<EventCluster>,
        lanes: Vec<SourceLane>,
        viewport: Viewport,
        layout: TimelineLayout,
        config: TimelineConfig,
    }

    impl Fixture {
        fn new(events: Vec<TimelineEvent>, start: i64, end: i64) -> Self {
            let config = TimelineConfig::default();
            let viewport = Viewport {
                scale: Scale::OneHour,
                position: 0.0,
                start: at(start),
                end: at(end),
            };
            let range = window_range(&events, &viewport, config.edge_buffer_ratio);
            let lanes = allocate_lanes(&events[range.clone()]);
            let layout = TimelineLayout::new(SurfaceMetrics::new(920.0, 224.0, 1.0), &config, lanes.len());
            let clusters = cluster_events(
                &events,
                range,
                &viewport,
                layout.plot_width(),
                config.cluster_min_distance,
            );
            Self {
                events,
                clusters,
                lanes,
                viewport,
                layout,
                config,
            }
        }

        fn input(&self) -> RenderInput<'_> {
            RenderInput {
                events: &self.events,
                clusters: &self.clusters,
                lanes: &self.lanes,
                viewport: &self.viewport,
                layout: &self.layout,
                config: &self.config,
                focus: None,
            }
        }
    }

    #[test]
    fn empty_window_draws_background_and_axis_only() {
        let fx = Fixture::new(Vec::new(), 0, 3600);
        let list = draw(&fx.input());
        assert!(matches!(list.commands[0], DrawCommand::Clear { .. }));
        assert_eq!(list.markers().count(), 0);
        assert!(list.commands.iter().any(|c| matches!(c, DrawCommand::Line { .. })));
    }

    #[test]
    fn markers_use_source_palette_and_lanes() {
        let fx = Fixture::new(events_at(&[("a", 0), ("b", 1800), ("b", 3000)]), 0, 3600);
        let list = draw(&fx.input());
        let fills: Vec<Rgb> = list
            .markers()
            .filter_map(|c| match c {
                DrawCommand::Circle { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, [source_color("a"), source_color("b"), source_color("b")]);
        let placements = place_markers(&fx.input());
        assert_eq!(placements[0].lane, 1);
        assert_eq!(placements[1].lane, 0);
    }

    #[test]
    fn context_switch_gets_dashed_ring() {
        let fx = Fixture::new(events_at(&[("a", 0), ("a", 900), ("b", 1800), ("a", 2700)]), 0, 3600);
        let list = draw(&fx.input());
        let rings = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Ring { dashed: true, .. }))
            .count();
        assert_eq!(rings, 2);
    }

    #[test]
    fn milestones_draw_diamonds_and_clusters_badges() {
        let events = vec![
            capture_event("a", 0, "x"),
            capture_event("a", 1, "y"),
            TimelineEvent::new(at(1800), "a", "ship", EventType::Milestone, Importance::High),
        ];
        let fx = Fixture::new(events, 0, 3600);
        let list = draw(&fx.input());
        assert_eq!(
            list.commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Diamond { .. }))
                .count(),
            1
        );
        let badges: Vec<usize> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Badge { count, .. } => Some(*count),
                _ => None,
            })
            .collect();
        assert_eq!(badges, [2]);
    }

    #[test]
    fn finer_scales_draw_larger_markers() {
        let fx = Fixture::new(events_at(&[("a", 0)]), 0, 3600);
        let fine = marker_radius(&fx.events[0], &fx.viewport, &fx.layout, &fx.config);
        let coarse_vp = Viewport {
            scale: Scale::ThirtyDays,
            ..fx.viewport
        };
        let coarse = marker_radius(&fx.events[0], &coarse_vp, &fx.layout, &fx.config);
        assert!(fine > coarse);

        let important = TimelineEvent::new(at(0), "a", "x", EventType::Capture, Importance::Critical);
        assert!(marker_radius(&important, &fx.viewport, &fx.layout, &fx.config) > fine);
    }

    #[test]
    fn related_events_are_connected_once() {
        let commit = TimelineEvent::new(at(3000), "a", "feat: x", EventType::Commit, Importance::High)
            .with_commit_id("abcdef1234");
        let note = capture_event("a", 600, "see abcdef1").with_related(commit.id);
        let commit = commit.with_related(note.id);
        let fx = Fixture::new(vec![note, commit], 0, 3600);
        let list = draw(&fx.input());
        let curves = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Curve { .. }))
            .count();
        assert_eq!(curves, 1);

        let mut quiet = Fixture::new(fx.events.clone(), 0, 3600);
        quiet.config.show_connections = false;
        assert!(
            !draw(&quiet.input())
                .commands
                .iter()
                .any(|c| matches!(c, DrawCommand::Curve { .. }))
        );
    }

    #[test]
    fn axis_labels_follow_scale() {
        let fx = Fixture::new(Vec::new(), 0, 3600);
        let texts: Vec<String> = draw(&fx.input())
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["09:00", "10:00"]);

        let mut daily = Fixture::new(Vec::new(), 0, 3600);
        daily.viewport.scale = Scale::OneWeek;
        let texts: Vec<String> = draw(&daily.input())
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["2025-06-01", "2025-06-01"]);
    }

    #[test]
    fn focus_draws_highlight() {
        let fx = Fixture::new(events_at(&[("a", 0), ("b", 1800)]), 0, 3600);
        let mut input = fx.input();
        input.focus = Some(fx.events[1].id);
        let list = draw(&input);
        assert_eq!(
            list.commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::FocusRing { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn lane_lookup_miss_falls_back_to_zero() {
        assert_eq!(lane_for(&[], "ghost"), 0);
    }

    #[test]
    fn labels_are_truncated_to_column() {
        assert_eq!(fit_label("abcdef", 28.0, 7.0), "abc…");
        assert_eq!(fit_label("abc", 28.0, 7.0), "abc");
    }

    #[test]
    fn every_theme_has_distinct_background_and_text() {
        for theme in Theme::ALL {
            let p = ThemePalette::for_theme(theme);
            assert_ne!(p.background, p.text);
        }
    }
}
