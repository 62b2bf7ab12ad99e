//! Viewport controller: the `{scale, position}` state machine and playback.
//!
//! Every operation clamps instead of failing. Non-finite inputs leave the
//! state unchanged (NaN) or saturate to the nearest bound (infinities).
//! Each state change bumps [`ViewportController::revision`].

use std::time::Instant;

use chrono::{DateTime, Utc};
use journey_core::DateRange;
use journey_core::timestamps::{duration_secs, offset_by_secs, seconds_between};

use crate::scale::Scale;

/// Slowest playback speed, in journey-seconds per wall-clock second.
pub const MIN_SPEED: f64 = 0.001;
/// Fastest playback speed (roughly ten years per second).
pub const MAX_SPEED: f64 = 3.2e8;
/// One journey-hour per wall-clock second.
pub const DEFAULT_SPEED: f64 = 3600.0;

/// Snapshot of the visible window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: Scale,
    /// Position of the window within the journey, in `[0, 1]`.
    pub position: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Viewport {
    #[must_use]
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        seconds_between(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Playback {
    playing: bool,
    speed: f64,
    /// Wall-clock instant of the previous advance; `None` until the first
    /// frame after `play`.
    anchor: Option<Instant>,
}

fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else if speed == f64::INFINITY {
        MAX_SPEED
    } else {
        MIN_SPEED
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    journey: DateRange,
    scale: Scale,
    position: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    playback: Playback,
    scrub_base: Option<f64>,
    revision: u64,
}

impl ViewportController {
    #[must_use]
    pub fn new(journey: DateRange, scale: Scale) -> Self {
        let mut controller = Self {
            journey,
            scale,
            position: 0.0,
            start: journey.start,
            end: journey.end,
            playback: Playback {
                playing: false,
                speed: DEFAULT_SPEED,
                anchor: None,
            },
            scrub_base: None,
            revision: 0,
        };
        controller.apply_position(0.0);
        controller
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        Viewport {
            scale: self.scale,
            position: self.position,
            start: self.start,
            end: self.end,
        }
    }

    #[must_use]
    pub const fn journey(&self) -> DateRange {
        self.journey
    }

    #[must_use]
    pub const fn scale(&self) -> Scale {
        self.scale
    }

    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playback.playing
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.playback.speed
    }

    #[must_use]
    pub const fn is_scrubbing(&self) -> bool {
        self.scrub_base.is_some()
    }

    /// Bumped on every state change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    // -- geometry helpers ---------------------------------------------------

    fn full_secs(&self) -> f64 {
        duration_secs(self.journey.duration()).max(0.0)
    }

    fn window_secs(&self, scale: Scale) -> f64 {
        duration_secs(scale.effective_duration(self.journey.duration())).max(0.0)
    }

    /// Place the window for the current scale at `position`.
    fn apply_position(&mut self, position: f64) {
        let full = self.full_secs();
        let window = self.window_secs(self.scale);
        let slack = (full - window).max(0.0);
        self.position = position.clamp(0.0, 1.0);
        self.start = offset_by_secs(self.journey.start, self.position * slack);
        self.end = if self.scale == Scale::Full {
            self.journey.end
        } else {
            offset_by_secs(self.start, window).min(self.journey.end)
        };
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // -- operations ---------------------------------------------------------

    /// Switch scale, keeping the window centered on the current midpoint.
    /// Leaving [`Scale::Full`] uses the retained position instead.
    pub fn set_scale(&mut self, scale: Scale) {
        let leaving_full = self.scale == Scale::Full && scale != Scale::Full;
        self.scale = scale;
        if leaving_full || scale == Scale::Full {
            self.apply_position(self.position);
        } else {
            let full = self.full_secs();
            let window = self.window_secs(scale);
            let slack = (full - window).max(0.0);
            let midpoint = seconds_between(self.journey.start, self.start)
                + seconds_between(self.start, self.end) / 2.0;
            let start = (midpoint - window / 2.0).clamp(0.0, slack);
            let position = if slack > 0.0 { start / slack } else { 0.0 };
            self.apply_position(position);
        }
        self.bump();
    }

    /// Move one rung along the ladder.
    pub fn step_scale(&mut self, delta: i32) {
        let next = self.scale.step(delta);
        if next != self.scale {
            self.set_scale(next);
        }
    }

    pub fn set_position(&mut self, position: f64) {
        if position.is_nan() {
            return;
        }
        self.apply_position(position);
        self.bump();
    }

    /// Shift the window by `delta` of the pannable range
    /// (positive moves toward earlier time).
    pub fn pan(&mut self, delta: f64) {
        if delta.is_nan() {
            return;
        }
        self.set_position(self.position - delta);
    }

    /// Install a new journey range, keeping scale and position.
    pub fn set_journey(&mut self, journey: DateRange) {
        self.journey = journey;
        self.scrub_base = None;
        self.apply_position(self.position);
        self.bump();
    }

    // -- playback -----------------------------------------------------------

    /// Start playback. Playing from the end rewinds to the start first.
    pub fn play(&mut self, speed: f64) {
        self.playback.speed = sanitize_speed(speed);
        self.playback.playing = true;
        self.playback.anchor = None;
        if self.position >= 1.0 {
            self.apply_position(0.0);
        }
        self.bump();
    }

    pub fn pause(&mut self) {
        if self.playback.playing {
            self.playback.playing = false;
            self.playback.anchor = None;
            self.bump();
        }
    }

    /// Toggle between playing (at the current speed) and paused.
    pub fn toggle_play(&mut self) {
        if self.playback.playing {
            self.pause();
        } else {
            self.play(self.playback.speed);
        }
    }

    /// Rewind to the start and resume at the current speed.
    pub fn restart(&mut self) {
        self.apply_position(0.0);
        self.playback.playing = true;
        self.playback.anchor = None;
        self.bump();
    }

    pub fn set_speed(&mut self, speed: f64) {
        let speed = sanitize_speed(speed);
        if (speed - self.playback.speed).abs() > f64::EPSILON {
            self.playback.speed = speed;
            self.bump();
        }
    }

    /// Advance playback to wall-clock `now`. The first call after `play`
    /// only anchors the clock. Returns whether the position moved.
    pub fn advance(&mut self, now: Instant) -> bool {
        if !self.playback.playing {
            return false;
        }
        let Some(anchor) = self.playback.anchor.replace(now) else {
            return false;
        };
        let elapsed = now.saturating_duration_since(anchor).as_secs_f64();
        if elapsed <= 0.0 {
            return false;
        }
        let full = self.full_secs();
        let next = if full > 0.0 {
            (self.position + elapsed * self.playback.speed / full).min(1.0)
        } else {
            1.0
        };
        if next >= 1.0 {
            self.playback.playing = false;
            self.playback.anchor = None;
        }
        let moved = next > self.position;
        self.apply_position(next);
        self.bump();
        moved
    }

    // -- scrubbing ----------------------------------------------------------

    /// Capture the drag base position.
    pub fn begin_scrub(&mut self) {
        self.scrub_base = Some(self.position);
    }

    /// Position the window at `base + pointer_delta_ratio`.
    pub fn scrub(&mut self, pointer_delta_ratio: f64) {
        if pointer_delta_ratio.is_nan() {
            return;
        }
        let base = self.scrub_base.unwrap_or(self.position);
        self.set_position(base + pointer_delta_ratio);
    }

    pub fn end_scrub(&mut self) {
        self.scrub_base = None;
    }
}
