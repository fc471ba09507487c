//! Eased, interruptible transition of the theme scalar.
//!
//! `Idle(value) -> Animating(start, target, start_time) -> Idle(target)`.
//! A new request replaces the running one and starts from the last
//! rendered value, so re-triggering never jumps. Duration is proportional
//! to the distance left to cover.

use std::f64::consts::PI;

use tracing::{debug, info};

use super::{Direction, Theme};

/// Identifies one requested transition. Stale handles stop matching once
/// a newer request replaces the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Animating {
        start_value: f32,
        target: Theme,
        /// Stamped by the first tick after the request.
        start_time: Option<f64>,
        duration: f64,
    },
}

/// Sun/moon toggle icon crossfade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconState {
    /// Sun icon opacity.
    pub sun_opacity: f32,
    /// Moon icon opacity.
    pub moon_opacity: f32,
    /// Icon rotation, radians. Half a turn across the full range.
    pub rotation: f32,
}

/// Symmetric ease-in-out on `[0, 1]`.
pub fn ease_in_out(t: f64) -> f64 {
    (1.0 - (PI * t.clamp(0.0, 1.0)).cos()) / 2.0
}

/// Owns the theme scalar and drives transitions of it.
#[derive(Debug, Clone)]
pub struct ThemeController {
    value: f32,
    direction: Direction,
    theme: Theme,
    phase: Phase,
    generation: u64,
    full_duration: f64,
}

impl ThemeController {
    /// Create a controller at rest on `theme`.
    ///
    /// `full_duration` is the length of a complete 0 to 100 transition, seconds.
    pub fn new(theme: Theme, full_duration: f64) -> Self {
        let direction = match theme {
            Theme::Dark => Direction::TowardNight,
            Theme::Light => Direction::TowardDay,
        };
        Self {
            value: theme.value(),
            direction,
            theme,
            phase: Phase::Idle,
            generation: 0,
            full_duration: full_duration.max(0.0),
        }
    }

    /// Current scalar, `[0, 100]`.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Direction of the latest movement.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Label on the current side of the midpoint.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Theme the scalar is heading to, or resting on.
    pub fn target(&self) -> Theme {
        match self.phase {
            Phase::Animating { target, .. } => target,
            Phase::Idle => self.theme,
        }
    }

    /// Whether a transition is running.
    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating { .. })
    }

    /// Whether `handle` still names the running transition.
    pub fn is_current(&self, handle: TransitionHandle) -> bool {
        self.is_animating() && handle.0 == self.generation
    }

    /// Start a transition toward `target`, replacing any running one.
    pub fn request(&mut self, target: Theme) -> TransitionHandle {
        self.generation += 1;
        let distance = (target.value() - self.value).abs();
        if distance == 0.0 {
            self.phase = Phase::Idle;
            self.theme = target;
            return TransitionHandle(self.generation);
        }
        let duration = f64::from(distance) / 100.0 * self.full_duration;
        self.direction = Direction::between(self.value, target.value());
        self.phase = Phase::Animating {
            start_value: self.value,
            target,
            start_time: None,
            duration,
        };
        debug!(
            from = self.value,
            target = target.label(),
            duration,
            "Theme transition requested"
        );
        TransitionHandle(self.generation)
    }

    /// Head for the opposite of the current target.
    pub fn toggle(&mut self) -> TransitionHandle {
        self.request(self.target().opposite())
    }

    /// Advance to wall time `now` (seconds). Returns the new label when the
    /// scalar crosses the midpoint this tick.
    pub fn tick(&mut self, now: f64) -> Option<Theme> {
        let Phase::Animating {
            start_value,
            target,
            start_time,
            duration,
        } = &mut self.phase
        else {
            return None;
        };
        let start = *start_time.get_or_insert(now);
        let t = if *duration > 0.0 {
            ((now - start) / *duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let end = target.value();
        if t >= 1.0 {
            self.value = end;
            self.phase = Phase::Idle;
        } else {
            let eased = ease_in_out(t) as f32;
            self.value = *start_value + (end - *start_value) * eased;
        }
        self.settle_label()
    }

    /// Jump to `value` directly, cancelling any transition. Used by the
    /// automatic cycle. Returns the new label on a midpoint crossing.
    pub fn follow(&mut self, value: f32, direction: Direction) -> Option<Theme> {
        if self.is_animating() {
            self.generation += 1;
            self.phase = Phase::Idle;
        }
        if value.is_finite() {
            self.value = value.clamp(0.0, 100.0);
        }
        self.direction = direction;
        self.settle_label()
    }

    fn settle_label(&mut self) -> Option<Theme> {
        let next = Theme::for_value(self.value, self.theme);
        if next == self.theme {
            return None;
        }
        self.theme = next;
        info!("Theme flipped to {}", next.label());
        Some(next)
    }

    /// Icon crossfade for the current scalar.
    pub fn icon(&self) -> IconState {
        let t = self.value / 100.0;
        IconState {
            sun_opacity: t,
            moon_opacity: 1.0 - t,
            rotation: t * std::f32::consts::PI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: f64 = 1.2;

    fn run_until_idle(c: &mut ThemeController, start: f64, step: f64) -> (f64, Vec<Theme>) {
        let mut now = start;
        let mut flips = Vec::new();
        for _ in 0..10_000 {
            if let Some(t) = c.tick(now) {
                flips.push(t);
            }
            if !c.is_animating() {
                return (now, flips);
            }
            now += step;
        }
        panic!("transition never finished");
    }

    #[test]
    fn test_full_transition_takes_full_duration() {
        let mut c = ThemeController::new(Theme::Dark, FULL);
        c.request(Theme::Light);
        let (end, flips) = run_until_idle(&mut c, 10.0, 1.0 / 60.0);
        assert_eq!(c.value(), 100.0);
        assert_eq!(flips, vec![Theme::Light]);
        assert!((end - 10.0 - FULL).abs() < 1.0 / 30.0);
    }

    #[test]
    fn test_first_tick_renders_start_value() {
        let mut c = ThemeController::new(Theme::Dark, FULL);
        c.request(Theme::Light);
        assert_eq!(c.tick(5.0), None);
        assert_eq!(c.value(), 0.0);
    }

    #[test]
    fn test_interrupt_is_continuous() {
        let mut c = ThemeController::new(Theme::Dark, FULL);
        c.request(Theme::Light);
        let mut now = 0.0;
        for _ in 0..20 {
            c.tick(now);
            now += 1.0 / 60.0;
        }
        let last = c.value();
        assert!(last > 0.0 && last < 100.0);
        c.toggle();
        c.tick(now);
        assert_eq!(c.value(), last);
        assert_eq!(c.direction(), Direction::TowardNight);
    }

    #[test]
    fn test_partial_reversal_is_shorter() {
        let mut c = ThemeController::new(Theme::Dark, FULL);
        c.request(Theme::Light);
        let step = 1.0 / 60.0;
        let mut now = 0.0;
        for _ in 0..18 {
            c.tick(now);
            now += step;
        }
        let reached = c.value();
        c.toggle();
        let (end, _) = run_until_idle(&mut c, now, step);
        assert_eq!(c.value(), 0.0);
        assert_eq!(c.theme(), Theme::Dark);
        let back = end - now;
        assert!(back < FULL * f64::from(reached) / 100.0 + step);
        assert!(end < FULL, "double toggle took {end}s");
    }

    #[test]
    fn test_stale_handle() {
        let mut c = ThemeController::new(Theme::Dark, FULL);
        let first = c.request(Theme::Light);
        assert!(c.is_current(first));
        let second = c.toggle();
        assert!(!c.is_current(first));
        assert!(c.is_current(second));
    }

    #[test]
    fn test_request_current_theme_is_noop() {
        let mut c = ThemeController::new(Theme::Light, FULL);
        c.request(Theme::Light);
        assert!(!c.is_animating());
        assert_eq!(c.tick(1.0), None);
        assert_eq!(c.value(), 100.0);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut c = ThemeController::new(Theme::Dark, 0.0);
        c.request(Theme::Light);
        assert_eq!(c.tick(0.0), Some(Theme::Light));
        assert_eq!(c.value(), 100.0);
    }

    #[test]
    fn test_follow_cancels_and_flips() {
        let mut c = ThemeController::new(Theme::Dark, FULL);
        c.request(Theme::Light);
        assert_eq!(c.follow(70.0, Direction::TowardDay), Some(Theme::Light));
        assert!(!c.is_animating());
        assert_eq!(c.follow(60.0, Direction::TowardNight), None);
    }

    #[test]
    fn test_ease_is_symmetric() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-12);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_icon_crossfade() {
        let c = ThemeController::new(Theme::Dark, FULL);
        let icon = c.icon();
        assert_eq!(icon.moon_opacity, 1.0);
        assert_eq!(icon.sun_opacity, 0.0);
    }
}
