//! Frame scheduling.
//!
//! The host calls [`FrameScheduler::run_frame`] once per display refresh.
//! At most one frame is pending at a time; a target that wants to keep
//! animating asks for the next frame by returning `true` from
//! [`FrameTarget::update`]. Cancelling is handle invalidation: a cancelled
//! handle simply never runs.

use tracing::{trace, warn};

/// Longest frame delta passed to a target. Longer gaps (a backgrounded
/// tab, a debugger pause) are clamped and the scene slows down instead.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Something advanced once per frame.
pub trait FrameTarget {
    /// Advance by `dt` seconds. Return `true` to request another frame.
    fn update(&mut self, dt: f64) -> bool;
}

/// Names one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Single-slot frame scheduler.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<FrameHandle>,
    next_id: u64,
    previous_time: Option<f64>,
    frame_count: u64,
    total_time: f64,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the next frame. Returns the already pending handle if any.
    pub fn request(&mut self) -> FrameHandle {
        if let Some(handle) = self.pending {
            return handle;
        }
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    /// Cancel `handle`. Returns `false` if it was not pending.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            self.previous_time = None;
            true
        } else {
            false
        }
    }

    /// Whether `handle` will run on the next frame.
    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending == Some(handle)
    }

    /// Whether any frame is pending.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Run the pending frame at wall time `now` (seconds).
    ///
    /// Returns `false` without touching `target` when nothing is pending.
    pub fn run_frame<T: FrameTarget + ?Sized>(&mut self, now: f64, target: &mut T) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        let mut dt = match self.previous_time {
            Some(previous) if now.is_finite() => (now - previous).max(0.0),
            _ => 0.0,
        };
        if dt > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            dt = MAX_FRAME_TIME;
        }
        self.previous_time = Some(now);
        self.total_time += dt;
        self.frame_count += 1;
        trace!(frame = self.frame_count, dt, "Running frame");
        if target.update(dt) {
            self.request();
        }
        true
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of the deltas handed to targets, seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}
