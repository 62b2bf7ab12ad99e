//! Trailing-edge debounce driven by frame timestamps, with an optional
//! max-wait so an unbroken stream of triggers still fires.

use std::time::{Duration, Instant};

/// Fires once, `window` after the last trigger. Each trigger pushes the
/// deadline out again, but never past `max_wait` after the first trigger of
/// the burst; there is never more than one pending deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    max_wait: Option<Duration>,
    burst_start: Option<Instant>,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            max_wait: None,
            burst_start: None,
            deadline: None,
        }
    }

    /// Cap how long continuous triggers can hold the deadline off.
    #[must_use]
    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub const fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    pub fn trigger(&mut self, now: Instant) {
        let burst_start = *self.burst_start.get_or_insert(now);
        let trailing = now + self.window;
        self.deadline = Some(match self.max_wait {
            Some(max_wait) => trailing.min(burst_start + max_wait),
            None => trailing,
        });
    }

    /// True exactly once when the pending deadline has passed.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.burst_start = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
