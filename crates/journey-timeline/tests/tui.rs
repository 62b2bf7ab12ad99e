//! Terminal adapter: engine frames rasterized into ftui frames, hit regions
//! and input mapping.

use std::time::Instant;

use ftui::layout::Rect;
use ftui::render::frame::Frame;
use ftui::{Event, GraphemePool, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use journey_core::{DateRange, TimelineEvent};
use journey_test_helpers::{at, events_at};
use journey_timeline::{
    SurfaceMetrics, TimelineConfig, TimelineEngine, TuiInputMapper, rasterize, register_zone_hits,
    zone_for_hit,
};

const WIDTH: u16 = 60;
const HEIGHT: u16 = 12;

fn terminal_engine(events: Vec<TimelineEvent>) -> TimelineEngine {
    TimelineEngine::new(
        events,
        TimelineConfig::terminal(),
        SurfaceMetrics::new(f64::from(WIDTH), f64::from(HEIGHT), 1.0),
    )
}

/// `a` at 60s and 540s, `b` at 300s over a [0s, 600s] journey: a 48-cell
/// plot from column 12 puts the markers at columns 16, 36 and 55.
fn scene() -> TimelineEngine {
    let mut engine = terminal_engine(Vec::new());
    engine.set_events(
        events_at(&[("a", 60), ("b", 300), ("a", 540)]),
        Some(DateRange::new(at(0), at(600))),
    );
    engine
}

fn char_at(frame: &Frame<'_>, x: u16, y: u16) -> Option<char> {
    frame.buffer.get(x, y).and_then(|c| c.content.as_char())
}

#[test]
fn markers_land_in_lane_rows() {
    let mut engine = scene();
    let list = engine.render_frame(Instant::now()).draw_list.clone();
    let mut pool = GraphemePool::new();
    let mut frame = Frame::new(WIDTH, HEIGHT, &mut pool);
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    rasterize(&mut frame, area, &list);

    // "a" is the base lane (row 2); "b" sits in lane 1 (row 6).
    assert_eq!(char_at(&frame, 16, 2), Some('●'));
    // Context switches swap in the ringed glyph.
    assert_eq!(char_at(&frame, 36, 6), Some('◉'));
    assert_eq!(char_at(&frame, 55, 2), Some('◉'));
    // Lane labels in the label column.
    assert_eq!(char_at(&frame, 0, 2), Some('a'));
    assert_eq!(char_at(&frame, 0, 6), Some('b'));
    // Axis on the last row, start label at the plot edge.
    assert_eq!(char_at(&frame, 30, HEIGHT - 1), Some('─'));
    assert_eq!(char_at(&frame, 12, HEIGHT - 1), Some('2'));
}

#[test]
fn zone_hits_resolve_to_events() {
    let engine = scene();
    let mut pool = GraphemePool::new();
    let mut frame = Frame::with_hit_grid(WIDTH, HEIGHT, &mut pool);
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    register_zone_hits(&mut frame, area, engine.zones());

    let (id, _, _) = frame.hit_test(36, 6).expect("zone over the b marker");
    let index = zone_for_hit(id).expect("zone hit id");
    let zone = &engine.zones()[index];
    assert_eq!(engine.events()[zone.event_index].source, "b");
    assert!(frame.hit_test(5, 5).is_none());
}

#[test]
fn mouse_click_selects_through_mapper() {
    let mut engine = scene();
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let layout = engine.render_frame(Instant::now()).layout;
    let mut mapper = TuiInputMapper::from_layout(area, &layout);

    let mut selections = Vec::new();
    for event in [
        Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 36, 6)),
        Event::Mouse(MouseEvent::new(MouseEventKind::Up(MouseButton::Left), 36, 6)),
    ] {
        for input in mapper.map_event(&event) {
            selections.extend(engine.apply(input));
        }
    }
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].event.source, "b");
}

#[test]
fn hover_shows_tooltip_inside_terminal() {
    let mut engine = scene();
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let layout = engine.render_frame(Instant::now()).layout;
    let mut mapper = TuiInputMapper::from_layout(area, &layout);
    for input in mapper.map_event(&Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 55, 2))) {
        engine.apply(input);
    }
    let tip = engine.tooltip().expect("tooltip over the last marker");
    assert_eq!(tip.source, "a");
    assert!(tip.x + tip.width <= f64::from(WIDTH));
    assert!(tip.y + tip.height <= f64::from(HEIGHT));
}

#[test]
fn keyboard_focus_highlights_marker() {
    let mut engine = scene();
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let layout = engine.render_frame(Instant::now()).layout;
    let mut mapper = TuiInputMapper::from_layout(area, &layout);
    for input in mapper.map_event(&Event::Key(KeyEvent::new(KeyCode::Tab))) {
        engine.apply(input);
    }
    let list = engine.render_frame(Instant::now()).draw_list.clone();

    let mut pool = GraphemePool::new();
    let mut frame = Frame::new(WIDTH, HEIGHT, &mut pool);
    rasterize(&mut frame, area, &list);
    let focused = frame.buffer.get(16, 2).map(|c| c.bg);
    let neighbour = frame.buffer.get(17, 2).map(|c| c.bg);
    assert_ne!(focused, neighbour);
}

#[test]
fn drag_scrubs_viewport() {
    let mut engine = terminal_engine(events_at(&[("a", 0), ("a", 86_400 * 4)]));
    let area = Rect::new(0, 0, WIDTH, HEIGHT);
    let layout = engine.render_frame(Instant::now()).layout;
    let mut mapper = TuiInputMapper::from_layout(area, &layout);
    let before = engine.viewport().position;
    for event in [
        Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 20, 3)),
        Event::Mouse(MouseEvent::new(MouseEventKind::Drag(MouseButton::Left), 44, 3)),
        Event::Mouse(MouseEvent::new(MouseEventKind::Up(MouseButton::Left), 44, 3)),
    ] {
        for input in mapper.map_event(&event) {
            engine.apply(input);
        }
    }
    // 24 cells of a 48-cell track.
    assert!((engine.viewport().position - (before + 0.5)).abs() < 1e-9);
    assert!(!mapper.is_dragging());
}
