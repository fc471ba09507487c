//! Frame-coherent pointer tracker.
//!
//! [`PointerState`] accumulates pointer and touch events between frames and
//! exposes position, per-frame delta, and press state.

use glam::Vec2;

/// Frame-coherent pointer state.
///
/// 1. Forward host events via the `on_*` methods.
/// 2. Query state with the accessors.
/// 3. Call [`clear_transients`](Self::clear_transients) at end of frame.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    position: Vec2,
    delta: Vec2,
    pressed: bool,
    just_pressed: bool,
    seen: bool,
}

impl PointerState {
    /// Creates a pointer at the origin that has not moved yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer or touch move.
    pub fn on_move(&mut self, position: Vec2) {
        if self.seen {
            self.delta += position - self.position;
        }
        self.position = position;
        self.seen = true;
    }

    /// Process a press at `position`.
    pub fn on_down(&mut self, position: Vec2) {
        self.on_move(position);
        self.pressed = true;
        self.just_pressed = true;
    }

    /// Process a release.
    pub fn on_up(&mut self) {
        self.pressed = false;
    }

    /// Clears per-frame transients.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.just_pressed = false;
    }

    /// Last known position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Movement since the last clear.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Whether the pointer is held.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether a press happened this frame.
    #[must_use]
    pub fn just_pressed(&self) -> bool {
        self.just_pressed
    }

    /// Whether any pointer event has been seen.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.seen
    }

    /// Pointer position relative to `center`.
    #[must_use]
    pub fn offset_from(&self, center: Vec2) -> Vec2 {
        self.position - center
    }
}
