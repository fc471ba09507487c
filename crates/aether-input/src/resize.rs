//! Resize coalescing.
//!
//! Hosts emit resize events continuously while the user drags a window edge.
//! Regeneration is O(n²) in star count, so sizes are held until no new event
//! arrives for a quiet window and only the last one is released.

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    width: u32,
    height: u32,
    at: f64,
}

/// Debounces resize events over a quiet window.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet_seconds: f64,
    pending: Option<PendingResize>,
}

impl ResizeDebouncer {
    /// Create a debouncer releasing sizes after `quiet_seconds` without events.
    pub fn new(quiet_seconds: f64) -> Self {
        Self {
            quiet_seconds: quiet_seconds.max(0.0),
            pending: None,
        }
    }

    /// Record a resize at time `now` (seconds). Restarts the quiet window.
    pub fn push(&mut self, width: u32, height: u32, now: f64) {
        trace!(width, height, "resize queued");
        self.pending = Some(PendingResize { width, height, at: now });
    }

    /// Release the last queued size once the quiet window has elapsed.
    pub fn poll(&mut self, now: f64) -> Option<(u32, u32)> {
        let pending = self.pending?;
        if now - pending.at >= self.quiet_seconds {
            self.pending = None;
            Some((pending.width, pending.height))
        } else {
            None
        }
    }

    /// Whether a size is waiting for its quiet window.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Whether a change from `from` to `to` exceeds `threshold` pixels on either axis.
pub fn exceeds_jitter(from: (u32, u32), to: (u32, u32), threshold: u32) -> bool {
    from.0.abs_diff(to.0) > threshold || from.1.abs_diff(to.1) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_after_quiet_window() {
        let mut d = ResizeDebouncer::new(0.25);
        d.push(1920, 1080, 1.0);
        assert_eq!(d.poll(1.1), None);
        assert!(d.is_pending());
        assert_eq!(d.poll(1.25), Some((1920, 1080)));
        assert!(!d.is_pending());
        assert_eq!(d.poll(2.0), None);
    }

    #[test]
    fn test_continuous_drag_coalesces_to_last_size() {
        let mut d = ResizeDebouncer::new(0.25);
        let mut released = Vec::new();
        for step in 0..20u32 {
            let now = f64::from(step) * 0.05;
            d.push(800 + step * 50, 600 + step * 20, now);
            if let Some(size) = d.poll(now) {
                released.push(size);
            }
        }
        assert!(released.is_empty(), "nothing released mid-drag");
        assert_eq!(d.poll(10.0), Some((1750, 980)));
    }

    #[test]
    fn test_jitter_threshold() {
        assert!(!exceeds_jitter((800, 600), (820, 630), 40));
        assert!(exceeds_jitter((800, 600), (800, 641), 40));
        assert!(exceeds_jitter((800, 600), (1920, 1080), 40));
        assert!(!exceeds_jitter((800, 600), (800, 600), 0));
    }
}
