//! Self-rescheduling frame loop.
//!
//! The loop holds at most one outstanding frame handle. Each delivered frame
//! schedules the next one a frame budget later; `stop` cancels the
//! outstanding handle synchronously, and frames delivered with a stale
//! handle are ignored.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Opaque token for a scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Host hook that delivers frames at (or after) a requested instant.
pub trait FrameScheduler {
    fn schedule(&mut self, at: Instant) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// In-process scheduler: the host polls [`DeadlineScheduler::take_due`] and
/// feeds the handles back into the engine.
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    next_id: u64,
    pending: BTreeMap<FrameHandle, Instant>,
}

impl DeadlineScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every handle due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<FrameHandle> {
        let mut due: Vec<(Instant, FrameHandle)> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(h, at)| (*at, *h))
            .collect();
        due.sort();
        for (_, handle) in &due {
            self.pending.remove(handle);
        }
        due.into_iter().map(|(_, h)| h).collect()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for DeadlineScheduler {
    fn schedule(&mut self, at: Instant) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.insert(handle, at);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn schedule(&mut self, at: Instant) -> FrameHandle {
        (**self).schedule(at)
    }

    fn cancel(&mut self, handle: FrameHandle) {
        (**self).cancel(handle);
    }
}

#[derive(Debug)]
pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    budget: Duration,
    handle: Option<FrameHandle>,
    frames: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub const fn new(scheduler: S, budget: Duration) -> Self {
        Self {
            scheduler,
            budget,
            handle: None,
            frames: 0,
        }
    }

    /// Schedule the first frame immediately. No-op when already running.
    pub fn start(&mut self, now: Instant) {
        if self.handle.is_some() {
            return;
        }
        self.handle = Some(self.scheduler.schedule(now));
        tracing::debug!(budget_ms = self.budget.as_millis(), "render loop started");
    }

    /// Accept a delivered frame. Returns `false` for stale or unexpected
    /// handles; otherwise schedules the next frame and returns `true`.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Instant) -> bool {
        if self.handle != Some(handle) {
            return false;
        }
        self.frames += 1;
        self.handle = Some(self.scheduler.schedule(now + self.budget));
        true
    }

    /// Cancel the outstanding frame.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel(handle);
            tracing::debug!(frames = self.frames, "render loop stopped");
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub const fn pending_handle(&self) -> Option<FrameHandle> {
        self.handle
    }

    /// Frames accepted so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub const fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: FrameScheduler> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_reschedules_each_frame() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new(DeadlineScheduler::new(), Duration::from_millis(16));
        rl.start(t0);
        let due = rl.scheduler_mut().take_due(t0);
        assert_eq!(due.len(), 1);
        assert!(rl.on_frame(due[0], t0));
        assert_eq!(rl.scheduler().pending_count(), 1);
        assert!(rl.scheduler_mut().take_due(t0 + Duration::from_millis(15)).is_empty());
        let due = rl.scheduler_mut().take_due(t0 + Duration::from_millis(16));
        assert_eq!(due.len(), 1);
        assert!(rl.on_frame(due[0], t0 + Duration::from_millis(16)));
        assert_eq!(rl.frames(), 2);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new(DeadlineScheduler::new(), Duration::from_millis(16));
        rl.start(t0);
        let first = rl.pending_handle().unwrap();
        assert!(rl.on_frame(first, t0));
        assert!(!rl.on_frame(first, t0));
        assert_eq!(rl.frames(), 1);
    }

    #[test]
    fn stop_cancels_synchronously() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new(DeadlineScheduler::new(), Duration::from_millis(16));
        rl.start(t0);
        let handle = rl.pending_handle().unwrap();
        rl.stop();
        assert!(!rl.is_running());
        assert_eq!(rl.scheduler().pending_count(), 0);
        assert!(!rl.on_frame(handle, t0));
    }

    #[test]
    fn drop_cancels_through_borrowed_scheduler() {
        let t0 = Instant::now();
        let mut scheduler = DeadlineScheduler::new();
        {
            let mut rl = RenderLoop::new(&mut scheduler, Duration::from_millis(16));
            rl.start(t0);
        }
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn start_is_idempotent() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new(DeadlineScheduler::new(), Duration::from_millis(16));
        rl.start(t0);
        rl.start(t0);
        assert_eq!(rl.scheduler().pending_count(), 1);
    }
}
