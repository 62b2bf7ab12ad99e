//! The timeline context: events, viewport and tuning, plus the derived
//! per-frame state.
//!
//! Frame path (every frame): advance playback, window, cluster, draw.
//! Settle path (debounced after viewport changes, and at least once per
//! debounce window while changes keep coming): recompute lanes and rebuild
//! interaction zones. A data refresh settles immediately.

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use journey_core::{DateRange, JourneyData, TimelineEvent};

use crate::config::TimelineConfig;
use crate::debounce::Debouncer;
use crate::lanes::{LaneAllocator, SourceLane};
use crate::layout::{SurfaceMetrics, TimelineLayout};
use crate::overlay::{InteractionOverlay, InteractionZone, Selection, Tooltip};
use crate::render::{DrawList, RenderInput, draw};
use crate::render_loop::{DeadlineScheduler, FrameHandle, FrameScheduler, RenderLoop};
use crate::scale::Scale;
use crate::viewport::{Viewport, ViewportController};
use crate::window::{EventCluster, cluster_events, window_range};

/// Engine-level input, independent of the host's event types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineInput {
    Pan(f64),
    StepScale(i32),
    SetScale(Scale),
    SetPosition(f64),
    SetSpeed(f64),
    TogglePlay,
    Restart,
    ScrubStart,
    /// Pointer delta since the drag started, as a fraction of the track.
    Scrub(f64),
    ScrubEnd,
    Hover { x: f64, y: f64 },
    HoverEnd,
    Click { x: f64, y: f64 },
    FocusNext,
    FocusPrev,
    Activate,
    ClearFocus,
}

/// Output of one frame.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub viewport: Viewport,
    /// Indices of the windowed events in the full list.
    pub window: Range<usize>,
    pub clusters: Vec<EventCluster>,
    pub layout: TimelineLayout,
    pub draw_list: DrawList,
    /// Whether lanes and zones were recomputed on this frame.
    pub settled: bool,
}

fn sorted_events(events: Arc<[TimelineEvent]>) -> Arc<[TimelineEvent]> {
    if events.is_sorted_by_key(|e| e.timestamp) {
        return events;
    }
    let mut owned = events.to_vec();
    owned.sort_by_key(|e| e.timestamp);
    owned.into()
}

fn journey_range(events: &[TimelineEvent], fallback: Option<DateRange>) -> DateRange {
    fallback
        .or_else(|| DateRange::spanning(events.iter().map(|e| e.timestamp)))
        .unwrap_or_else(|| {
            let now = chrono::Utc::now();
            DateRange::new(now, now)
        })
}

pub struct TimelineEngine<S: FrameScheduler = DeadlineScheduler> {
    events: Arc<[TimelineEvent]>,
    viewport: ViewportController,
    config: TimelineConfig,
    surface: SurfaceMetrics,
    lanes: LaneAllocator,
    overlay: InteractionOverlay,
    debounce: Debouncer,
    render_loop: RenderLoop<S>,
    seen_revision: u64,
    last_frame: Option<RenderedFrame>,
}

impl TimelineEngine<DeadlineScheduler> {
    /// Engine over `events` (sorted if needed) with an in-process scheduler.
    #[must_use]
    pub fn new(
        events: impl Into<Arc<[TimelineEvent]>>,
        config: TimelineConfig,
        surface: SurfaceMetrics,
    ) -> Self {
        Self::with_scheduler(events, None, config, surface, DeadlineScheduler::new())
    }

    /// Engine over an aggregated journey, spanning its reported date range.
    #[must_use]
    pub fn from_journey(data: &JourneyData, config: TimelineConfig, surface: SurfaceMetrics) -> Self {
        Self::with_scheduler(
            data.events.clone(),
            Some(data.date_range),
            config,
            surface,
            DeadlineScheduler::new(),
        )
    }
}

impl<S: FrameScheduler> TimelineEngine<S> {
    pub fn with_scheduler(
        events: impl Into<Arc<[TimelineEvent]>>,
        journey: Option<DateRange>,
        config: TimelineConfig,
        surface: SurfaceMetrics,
        scheduler: S,
    ) -> Self {
        let events = sorted_events(events.into());
        let range = journey_range(&events, journey);
        let viewport = ViewportController::new(range, Scale::default());
        let mut engine = Self {
            events,
            seen_revision: viewport.revision(),
            viewport,
            debounce: Debouncer::new(config.recompute_debounce).with_max_wait(config.recompute_debounce),
            render_loop: RenderLoop::new(scheduler, config.frame_budget),
            config,
            surface,
            lanes: LaneAllocator::new(),
            overlay: InteractionOverlay::new(),
            last_frame: None,
        };
        engine.settle();
        engine
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    #[must_use]
    pub fn shared_events(&self) -> Arc<[TimelineEvent]> {
        Arc::clone(&self.events)
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    #[must_use]
    pub const fn controller(&self) -> &ViewportController {
        &self.viewport
    }

    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    #[must_use]
    pub const fn surface(&self) -> SurfaceMetrics {
        self.surface
    }

    #[must_use]
    pub fn lanes(&self) -> &[SourceLane] {
        self.lanes.lanes()
    }

    #[must_use]
    pub const fn lane_allocator(&self) -> &LaneAllocator {
        &self.lanes
    }

    #[must_use]
    pub fn zones(&self) -> &[InteractionZone] {
        self.overlay.zones()
    }

    #[must_use]
    pub const fn overlay(&self) -> &InteractionOverlay {
        &self.overlay
    }

    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.overlay.tooltip()
    }

    #[must_use]
    pub const fn last_frame(&self) -> Option<&RenderedFrame> {
        self.last_frame.as_ref()
    }

    /// Whether a lane/zone recompute is waiting for the debounce window.
    #[must_use]
    pub const fn is_settling(&self) -> bool {
        self.debounce.is_pending()
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub const fn scheduler_mut(&mut self) -> &mut S {
        self.render_loop.scheduler_mut()
    }

    // -- data ---------------------------------------------------------------

    /// Replace the event list. Lanes and zones are rebuilt right away and
    /// any pending debounced recompute is dropped.
    pub fn set_events(&mut self, events: impl Into<Arc<[TimelineEvent]>>, journey: Option<DateRange>) {
        self.events = sorted_events(events.into());
        let range = journey_range(&self.events, journey);
        self.viewport.set_journey(range);
        self.seen_revision = self.viewport.revision();
        self.debounce.cancel();
        self.lanes.invalidate();
        self.settle();
        tracing::info!(events = self.events.len(), "timeline data refreshed");
    }

    pub fn set_journey_data(&mut self, data: &JourneyData) {
        self.set_events(data.events.clone(), Some(data.date_range));
    }

    /// New surface size; zones follow immediately.
    pub fn resize(&mut self, surface: SurfaceMetrics) {
        if surface != self.surface {
            self.surface = surface;
            self.settle();
        }
    }

    // -- viewport operations ------------------------------------------------

    fn viewport_changed(&mut self) {
        self.overlay.hide_tooltip();
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.viewport.set_scale(scale);
        self.viewport_changed();
    }

    pub fn step_scale(&mut self, delta: i32) {
        self.viewport.step_scale(delta);
        self.viewport_changed();
    }

    pub fn set_position(&mut self, position: f64) {
        self.viewport.set_position(position);
        self.viewport_changed();
    }

    pub fn pan(&mut self, delta: f64) {
        self.viewport.pan(delta);
        self.viewport_changed();
    }

    pub fn play(&mut self, speed: f64) {
        self.viewport.play(speed);
        self.viewport_changed();
    }

    pub fn pause(&mut self) {
        self.viewport.pause();
    }

    pub fn toggle_play(&mut self) {
        self.viewport.toggle_play();
        self.viewport_changed();
    }

    pub fn restart(&mut self) {
        self.viewport.restart();
        self.viewport_changed();
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.viewport.set_speed(speed);
    }

    pub fn begin_scrub(&mut self) {
        self.viewport.begin_scrub();
    }

    pub fn scrub(&mut self, pointer_delta_ratio: f64) {
        self.viewport.scrub(pointer_delta_ratio);
        self.viewport_changed();
    }

    pub fn end_scrub(&mut self) {
        self.viewport.end_scrub();
    }

    // -- interaction --------------------------------------------------------

    pub fn hover(&mut self, x: f64, y: f64) -> Option<&Tooltip> {
        self.overlay
            .hover(x, y, &self.events, &self.surface, &self.config)
    }

    pub fn hover_end(&mut self) {
        self.overlay.hover_end();
    }

    pub fn click(&mut self, x: f64, y: f64) -> Option<Selection> {
        self.overlay.click(x, y, &self.events)
    }

    pub fn focus_next(&mut self) {
        self.overlay.focus_next();
    }

    pub fn focus_prev(&mut self) {
        self.overlay.focus_prev();
    }

    #[must_use]
    pub fn activate(&self) -> Option<Selection> {
        self.overlay.activate(&self.events)
    }

    pub fn clear_focus(&mut self) {
        self.overlay.clear_focus();
    }

    /// Dispatch an input. Returns a selection for clicks and activation.
    pub fn apply(&mut self, input: TimelineInput) -> Option<Selection> {
        match input {
            TimelineInput::Pan(delta) => self.pan(delta),
            TimelineInput::StepScale(delta) => self.step_scale(delta),
            TimelineInput::SetScale(scale) => self.set_scale(scale),
            TimelineInput::SetPosition(p) => self.set_position(p),
            TimelineInput::SetSpeed(speed) => self.set_speed(speed),
            TimelineInput::TogglePlay => self.toggle_play(),
            TimelineInput::Restart => self.restart(),
            TimelineInput::ScrubStart => self.begin_scrub(),
            TimelineInput::Scrub(ratio) => self.scrub(ratio),
            TimelineInput::ScrubEnd => self.end_scrub(),
            TimelineInput::Hover { x, y } => {
                self.hover(x, y);
            }
            TimelineInput::HoverEnd => self.hover_end(),
            TimelineInput::Click { x, y } => return self.click(x, y),
            TimelineInput::FocusNext => self.focus_next(),
            TimelineInput::FocusPrev => self.focus_prev(),
            TimelineInput::Activate => return self.activate(),
            TimelineInput::ClearFocus => self.clear_focus(),
        }
        None
    }

    // -- frames -------------------------------------------------------------

    pub fn start(&mut self, now: Instant) {
        self.render_loop.start(now);
    }

    /// Handle a frame delivered by the scheduler. Stale handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Instant) -> Option<&RenderedFrame> {
        if !self.render_loop.on_frame(handle, now) {
            return None;
        }
        Some(self.render_frame(now))
    }

    /// Run the frame path at `now` without the scheduler.
    pub fn render_frame(&mut self, now: Instant) -> &RenderedFrame {
        self.viewport.advance(now);
        let revision = self.viewport.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.overlay.hide_tooltip();
            self.debounce.trigger(now);
        }
        let settled = self.debounce.ready(now);
        if settled {
            tracing::debug!(revision, "debounced recompute");
        }
        self.derive_frame(settled)
    }

    /// Recompute lanes and zones now.
    fn settle(&mut self) {
        self.derive_frame(true);
    }

    fn derive_frame(&mut self, settle: bool) -> &RenderedFrame {
        let viewport = self.viewport.viewport();
        let window = window_range(&self.events, &viewport, self.config.edge_buffer_ratio);
        if settle {
            self.lanes.update(&self.events[window.clone()]);
        }
        let layout = TimelineLayout::new(self.surface, &self.config, self.lanes.lane_count());
        let clusters = cluster_events(
            &self.events,
            window.clone(),
            &viewport,
            layout.plot_width(),
            self.config.cluster_min_distance,
        );
        let focus = self.overlay.focus();
        let input = RenderInput {
            events: &self.events,
            clusters: &clusters,
            lanes: self.lanes.lanes(),
            viewport: &viewport,
            layout: &layout,
            config: &self.config,
            focus,
        };
        if settle {
            self.overlay.rebuild(&input);
        }
        let draw_list = draw(&input);
        self.last_frame.insert(RenderedFrame {
            viewport,
            window,
            clusters,
            layout,
            draw_list,
            settled: settle,
        })
    }

    /// Stop the render loop and drop pending recomputes.
    pub fn shutdown(&mut self) {
        self.debounce.cancel();
        self.viewport.pause();
        self.render_loop.stop();
    }
}

impl<S: FrameScheduler> Drop for TimelineEngine<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_test_helpers::events_at;
    use std::time::Duration;

    fn engine(events: Vec<TimelineEvent>) -> TimelineEngine {
        TimelineEngine::new(
            events,
            TimelineConfig::default(),
            SurfaceMetrics::new(920.0, 224.0, 1.0),
        )
    }

    #[test]
    fn construction_settles_immediately() {
        let e = engine(events_at(&[("a", 0), ("b", 60)]));
        assert_eq!(e.lanes().len(), 2);
        assert_eq!(e.zones().len(), 2);
        assert!(e.last_frame().unwrap().settled);
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let mut events = events_at(&[("a", 0), ("b", 60)]);
        events.reverse();
        let e = engine(events);
        assert!(e.events()[0].timestamp < e.events()[1].timestamp);
    }

    #[test]
    fn viewport_change_defers_zone_rebuild() {
        let t0 = Instant::now();
        let mut e = engine(events_at(&[("a", 0), ("b", 3600), ("a", 7200)]));
        e.set_scale(Scale::OneHour);
        let epoch = e.overlay().epoch();
        let frame = e.render_frame(t0);
        assert!(!frame.settled);
        assert!(e.is_settling());
        assert_eq!(e.overlay().epoch(), epoch);

        e.pan(-0.5);
        e.render_frame(t0 + Duration::from_millis(200));
        assert_eq!(e.overlay().epoch(), epoch);
        // The second change pushed the deadline out.
        assert!(!e.render_frame(t0 + Duration::from_millis(300)).settled);
        assert!(e.render_frame(t0 + Duration::from_millis(450)).settled);
        assert_eq!(e.overlay().epoch(), epoch + 1);
        assert!(!e.is_settling());
    }

    #[test]
    fn apply_dispatches_inputs() {
        let mut e = engine(events_at(&[("a", 0), ("b", 86_400 * 3)]));
        e.apply(TimelineInput::StepScale(-1));
        assert_eq!(e.viewport().scale, Scale::SixHours);
        e.apply(TimelineInput::SetPosition(0.5));
        e.apply(TimelineInput::Pan(0.1));
        assert!((e.viewport().position - 0.4).abs() < 1e-9);
        e.apply(TimelineInput::TogglePlay);
        assert!(e.controller().is_playing());
        e.apply(TimelineInput::TogglePlay);
        assert!(!e.controller().is_playing());
        e.apply(TimelineInput::ScrubStart);
        e.apply(TimelineInput::Scrub(0.2));
        e.apply(TimelineInput::ScrubEnd);
        assert!((e.viewport().position - 0.6).abs() < 1e-9);
    }

    #[test]
    fn stale_frame_handles_do_not_render() {
        let t0 = Instant::now();
        let mut e = engine(events_at(&[("a", 0)]));
        e.start(t0);
        let due = e.scheduler_mut().take_due(t0);
        assert_eq!(due.len(), 1);
        assert!(e.on_frame(due[0], t0).is_some());
        assert!(e.on_frame(due[0], t0).is_none());
    }

    #[test]
    fn shutdown_clears_loop_and_debounce() {
        let t0 = Instant::now();
        let mut e = engine(events_at(&[("a", 0), ("a", 7200)]));
        e.start(t0);
        e.set_scale(Scale::OneHour);
        e.render_frame(t0);
        assert!(e.is_settling());
        e.shutdown();
        assert!(!e.is_running());
        assert!(!e.is_settling());
        assert_eq!(e.scheduler_mut().pending_count(), 0);
    }
}
