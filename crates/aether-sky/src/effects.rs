//! Short-lived effects spawned by input: shooting stars, contrails and
//! butterflies.
//!
//! Every effect starts with `life = 1` and loses a fixed fade rate per
//! frame. Scale decays geometrically down to a floor and opacity is
//! `life^exponent * scale`. An effect is removed once its life runs out,
//! it leaves the viewport by more than the off-screen margin, its position
//! stops being finite, or (streaks only) its speed underflows.

use std::f32::consts::{PI, TAU};

use aether_config::{ButterflyConfig, EffectsConfig, StreakConfig};
use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, trace};

use crate::color::rgb8;
use crate::population::sample;
use crate::viewport::Viewport;

/// Life at or below this counts as spent.
const LIFE_EPSILON: f32 = 1e-5;

/// Which effect to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Fast, steep streak seen at night.
    ShootingStar,
    /// Slow, long, nearly level streak seen by day.
    Contrail,
    /// Meandering butterfly seen by day.
    Butterfly,
}

/// Straight-line streak state.
#[derive(Debug, Clone, PartialEq)]
pub struct Streak {
    /// Velocity, pixels per frame.
    pub velocity: Vec2,
    /// Trail length at scale 1.
    pub trail_length: f32,
    /// Trail thickness at scale 1.
    pub thickness: f32,
    /// Core color.
    pub color: Vec3,
    /// Outer glow color.
    pub glow_color: Vec3,
    /// `life` exponent of the head disc.
    pub head_exponent: f32,
}

impl Streak {
    /// Unit direction of travel, `None` when the speed is below `epsilon`.
    pub fn direction(&self, epsilon: f32) -> Option<Vec2> {
        let speed = self.velocity.length();
        (speed.is_finite() && speed >= epsilon).then(|| self.velocity / speed)
    }
}

/// Butterfly flight state.
#[derive(Debug, Clone, PartialEq)]
pub struct Butterfly {
    /// Cruise speed, pixels per frame.
    pub speed: f32,
    /// Current heading, radians.
    pub heading: f32,
    /// Heading the wander oscillates around.
    pub base_heading: f32,
    /// Rendered orientation, eased toward `heading`.
    pub orientation: f32,
    /// Phase of the target heading oscillation.
    pub wander_phase: f32,
    /// Phase of the perpendicular flutter.
    pub flutter_phase: f32,
    /// Wing beat phase.
    pub wing_phase: f32,
    /// Wing span at scale 1.
    pub size: f32,
    /// Wing color.
    pub color: Vec3,
    wander_amplitude: f32,
    wander_rate: f32,
    steer: f32,
    flutter_amplitude: f32,
    flutter_rate: f32,
    wing_rate: f32,
    turn_ease: f32,
}

/// Variant-specific state of an effect.
#[derive(Debug, Clone, PartialEq)]
pub enum TransientEffect {
    /// See [`EffectKind::ShootingStar`].
    ShootingStar(Streak),
    /// See [`EffectKind::Contrail`].
    Contrail(Streak),
    /// See [`EffectKind::Butterfly`].
    Butterfly(Butterfly),
}

impl TransientEffect {
    /// Kind tag of this effect.
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::ShootingStar(_) => EffectKind::ShootingStar,
            Self::Contrail(_) => EffectKind::Contrail,
            Self::Butterfly(_) => EffectKind::Butterfly,
        }
    }
}

/// A live effect plus its shared life/scale/opacity bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    /// Screen position.
    pub position: Vec2,
    /// Remaining life, `[0, 1]`. Never increases.
    pub life: f32,
    /// Current scale.
    pub scale: f32,
    /// Current opacity.
    pub opacity: f32,
    /// Frames advanced since spawn.
    pub frames: u32,
    fade_rate: f32,
    scale_decay: f32,
    scale_floor: f32,
    opacity_exponent: f32,
    /// Variant state.
    pub effect: TransientEffect,
}

impl ActiveEffect {
    fn new(position: Vec2, physics: Physics, effect: TransientEffect) -> Self {
        Self {
            position,
            life: 1.0,
            scale: 1.0,
            opacity: 1.0,
            frames: 0,
            fade_rate: physics.fade_rate.max(0.0),
            scale_decay: physics.scale_decay,
            scale_floor: physics.scale_floor,
            opacity_exponent: physics.opacity_exponent,
            effect,
        }
    }

    /// Life lost per frame.
    pub fn fade_rate(&self) -> f32 {
        self.fade_rate
    }

    /// Opacity of a streak head, which fades faster than the tail.
    pub fn head_opacity(&self) -> f32 {
        match &self.effect {
            TransientEffect::ShootingStar(s) | TransientEffect::Contrail(s) => {
                self.life.powf(s.head_exponent) * self.scale
            }
            TransientEffect::Butterfly(_) => self.opacity,
        }
    }

    /// Advance one frame. Returns `false` when the effect should be removed.
    fn step(&mut self, viewport: Viewport, margin: f32, velocity_epsilon: f32) -> bool {
        match &mut self.effect {
            TransientEffect::ShootingStar(streak) | TransientEffect::Contrail(streak) => {
                if streak.direction(velocity_epsilon).is_none() {
                    return false;
                }
                self.position += streak.velocity;
            }
            TransientEffect::Butterfly(fly) => {
                self.position += fly.step();
            }
        }

        self.frames = self.frames.saturating_add(1);
        self.life = (1.0 - self.frames as f32 * self.fade_rate).clamp(0.0, 1.0);
        self.scale = (self.scale * self.scale_decay).max(self.scale_floor);
        self.opacity = self.life.powf(self.opacity_exponent) * self.scale;

        self.life > LIFE_EPSILON
            && self.opacity.is_finite()
            && viewport.contains(self.position, margin)
    }
}

/// Wrap `to - from` into `[-PI, PI)`.
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    (to - from + PI).rem_euclid(TAU) - PI
}

impl Butterfly {
    /// Advance flight by one frame and return the displacement.
    fn step(&mut self) -> Vec2 {
        self.heading = self.heading.rem_euclid(TAU);
        let target = self.base_heading + self.wander_amplitude * self.wander_phase.sin();
        self.heading += shortest_angle(self.heading, target) * self.steer;
        self.orientation += shortest_angle(self.orientation, self.heading) * self.turn_ease;
        self.wing_phase = (self.wing_phase + self.wing_rate).rem_euclid(TAU);
        self.flutter_phase = (self.flutter_phase + self.flutter_rate).rem_euclid(TAU);
        self.wander_phase = (self.wander_phase + self.wander_rate).rem_euclid(TAU);

        let forward = Vec2::from_angle(self.heading);
        forward * self.speed + forward.perp() * self.flutter_amplitude * self.flutter_phase.sin()
    }
}

#[derive(Debug, Clone, Copy)]
struct Physics {
    fade_rate: f32,
    scale_decay: f32,
    scale_floor: f32,
    opacity_exponent: f32,
}

impl From<&StreakConfig> for Physics {
    fn from(c: &StreakConfig) -> Self {
        Self {
            fade_rate: c.fade_rate,
            scale_decay: c.scale_decay,
            scale_floor: c.scale_floor,
            opacity_exponent: c.opacity_exponent,
        }
    }
}

impl From<&ButterflyConfig> for Physics {
    fn from(c: &ButterflyConfig) -> Self {
        Self {
            fade_rate: c.fade_rate,
            scale_decay: c.scale_decay,
            scale_floor: c.scale_floor,
            opacity_exponent: c.opacity_exponent,
        }
    }
}

/// Owns and advances every live effect.
#[derive(Debug, Clone)]
pub struct EffectEngine {
    config: EffectsConfig,
    effects: Vec<ActiveEffect>,
}

impl EffectEngine {
    /// Create an empty engine.
    pub fn new(config: EffectsConfig) -> Self {
        Self {
            config,
            effects: Vec::new(),
        }
    }

    /// Spawn an effect of `kind` at `at` with randomized launch parameters.
    pub fn spawn<R: Rng + ?Sized>(&mut self, kind: EffectKind, at: Vec2, rng: &mut R) {
        match kind {
            EffectKind::ShootingStar | EffectKind::Contrail => {
                let streak = match kind {
                    EffectKind::Contrail => &self.config.contrail,
                    _ => &self.config.shooting_star,
                };
                let speed = sample(rng, streak.speed);
                let mut angle = sample(rng, streak.angle);
                if rng.random::<bool>() {
                    angle = PI - angle;
                }
                self.spawn_streak(kind, at, speed, angle);
            }
            EffectKind::Butterfly => {
                let fly = &self.config.butterfly;
                let speed = sample(rng, fly.speed);
                let heading = rng.random::<f32>() * TAU;
                let color = if fly.colors.is_empty() {
                    [255, 255, 255]
                } else {
                    fly.colors[rng.random_range(0..fly.colors.len())]
                };
                let phase = rng.random::<f32>() * TAU;
                self.spawn_butterfly(at, speed, heading, color, phase);
            }
        }
    }

    /// Spawn a streak of `kind` heading along `direction` with a randomized
    /// speed. Returns `false` without spawning when `direction` is shorter
    /// than the velocity epsilon.
    pub fn spawn_along<R: Rng + ?Sized>(
        &mut self,
        kind: EffectKind,
        at: Vec2,
        direction: Vec2,
        rng: &mut R,
    ) -> bool {
        if !direction.is_finite() || direction.length() < self.config.velocity_epsilon {
            return false;
        }
        let band = match kind {
            EffectKind::Contrail => self.config.contrail.speed,
            EffectKind::ShootingStar | EffectKind::Butterfly => self.config.shooting_star.speed,
        };
        let speed = sample(rng, band);
        self.spawn_streak(kind, at, speed, direction.y.atan2(direction.x));
        true
    }

    /// Spawn a streak with explicit speed (pixels per frame) and angle.
    ///
    /// `kind` selects the shooting star or contrail look; a butterfly kind
    /// is treated as a shooting star.
    pub fn spawn_streak(&mut self, kind: EffectKind, at: Vec2, speed: f32, angle: f32) {
        let (config, contrail) = match kind {
            EffectKind::Contrail => (&self.config.contrail, true),
            EffectKind::ShootingStar | EffectKind::Butterfly => (&self.config.shooting_star, false),
        };
        let streak = Streak {
            velocity: Vec2::from_angle(angle) * speed,
            trail_length: config.trail_length,
            thickness: config.thickness,
            color: rgb8(config.color),
            glow_color: rgb8(config.glow_color),
            head_exponent: config.head_exponent,
        };
        let physics = Physics::from(config);
        let effect = if contrail {
            TransientEffect::Contrail(streak)
        } else {
            TransientEffect::ShootingStar(streak)
        };
        self.push(ActiveEffect::new(at, physics, effect));
    }

    /// Spawn a butterfly with explicit flight parameters.
    pub fn spawn_butterfly(
        &mut self,
        at: Vec2,
        speed: f32,
        heading: f32,
        color: [u8; 3],
        phase: f32,
    ) {
        let config = &self.config.butterfly;
        let fly = Butterfly {
            speed,
            heading,
            base_heading: heading,
            orientation: heading,
            wander_phase: phase,
            flutter_phase: phase,
            wing_phase: 0.0,
            size: config.size,
            color: rgb8(color),
            wander_amplitude: config.wander_amplitude,
            wander_rate: config.wander_rate,
            steer: config.steer_blend,
            flutter_amplitude: config.flutter_amplitude,
            flutter_rate: config.flutter_rate,
            wing_rate: config.wing_rate,
            turn_ease: config.turn_ease,
        };
        let physics = Physics::from(config);
        self.push(ActiveEffect::new(at, physics, TransientEffect::Butterfly(fly)));
    }

    fn push(&mut self, effect: ActiveEffect) {
        let cap = self.config.max_active.max(1);
        if self.effects.len() >= cap {
            let excess = self.effects.len() + 1 - cap;
            self.effects.drain(..excess);
            debug!("Effect cap {cap} reached, dropped {excess} oldest");
        }
        trace!(kind = ?effect.effect.kind(), position = ?effect.position, "Spawned effect");
        self.effects.push(effect);
    }

    /// Advance every effect one frame and drop the finished ones.
    /// Returns the number removed.
    pub fn update(&mut self, viewport: Viewport) -> usize {
        let margin = self.config.offscreen_margin;
        let epsilon = self.config.velocity_epsilon;
        let before = self.effects.len();
        self.effects.retain_mut(|e| e.step(viewport, margin, epsilon));
        before - self.effects.len()
    }

    /// Live effects, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    /// Number of live effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effect is live.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Drop every effect.
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Streak speeds below this are treated as degenerate.
    pub fn velocity_epsilon(&self) -> f32 {
        self.config.velocity_epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn engine() -> EffectEngine {
        EffectEngine::new(EffectsConfig::default())
    }

    fn viewport() -> Viewport {
        Viewport::new(800, 600)
    }

    #[test]
    fn test_streak_moves_linearly_and_fades() {
        let mut fx = engine();
        fx.spawn_streak(EffectKind::ShootingStar, Vec2::new(400.0, 300.0), 0.5, 0.0);
        let rate = fx.iter().next().unwrap().fade_rate();
        for n in 1..=20u32 {
            fx.update(viewport());
            let e = fx.iter().next().unwrap();
            assert!((e.position - Vec2::new(400.0 + 0.5 * n as f32, 300.0)).length() < 1e-3);
            assert!((e.life - (1.0 - n as f32 * rate)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_removed_within_ceil_inverse_rate() {
        let mut fx = engine();
        fx.spawn_streak(EffectKind::ShootingStar, Vec2::new(400.0, 300.0), 0.5, 0.0);
        let rate = fx.iter().next().unwrap().fade_rate();
        let limit = (1.0 / rate).ceil() as u32;
        let mut last_life = 1.0;
        let mut frames = 0;
        while !fx.is_empty() {
            fx.update(viewport());
            frames += 1;
            if let Some(e) = fx.iter().next() {
                assert!(e.life <= last_life);
                last_life = e.life;
            }
            assert!(frames <= limit, "still alive after {frames} frames");
        }
    }

    #[test]
    fn test_degenerate_velocity_removed() {
        let mut fx = engine();
        fx.spawn_streak(EffectKind::Contrail, Vec2::new(100.0, 100.0), 0.0, 0.0);
        assert_eq!(fx.update(viewport()), 1);
        assert!(fx.is_empty());
    }

    #[test]
    fn test_offscreen_removed() {
        let mut fx = engine();
        fx.spawn_streak(EffectKind::ShootingStar, Vec2::new(795.0, 300.0), 200.0, 0.0);
        fx.update(viewport());
        assert!(fx.is_empty());
    }

    #[test]
    fn test_scale_decays_to_floor() {
        let mut fx = engine();
        let floor = EffectsConfig::default().contrail.scale_floor;
        fx.spawn_streak(EffectKind::Contrail, Vec2::new(10.0, 300.0), 0.01, 0.0);
        let mut last = 1.0;
        for _ in 0..150 {
            fx.update(viewport());
            let e = fx.iter().next().unwrap();
            assert!(e.scale <= last && e.scale >= floor);
            last = e.scale;
        }
    }

    #[test]
    fn test_head_fades_faster_than_tail() {
        let mut fx = engine();
        fx.spawn_streak(EffectKind::ShootingStar, Vec2::new(100.0, 300.0), 0.5, 0.0);
        for _ in 0..10 {
            fx.update(viewport());
        }
        let e = fx.iter().next().unwrap();
        assert!(e.head_opacity() < e.opacity);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let config = EffectsConfig {
            max_active: 3,
            ..EffectsConfig::default()
        };
        let mut fx = EffectEngine::new(config);
        for i in 0..5 {
            fx.spawn_streak(EffectKind::ShootingStar, Vec2::new(i as f32, 0.0), 1.0, 0.0);
        }
        assert_eq!(fx.len(), 3);
        assert_eq!(fx.iter().next().unwrap().position.x, 2.0);
    }

    #[test]
    fn test_butterfly_orientation_eases() {
        let mut fx = engine();
        fx.spawn_butterfly(Vec2::new(400.0, 300.0), 1.0, 0.0, [255, 170, 60], 1.0);
        let mut previous = None;
        for _ in 0..60 {
            fx.update(viewport());
            let e = fx.iter().next().unwrap();
            let TransientEffect::Butterfly(fly) = &e.effect else {
                panic!("expected butterfly");
            };
            let gap = shortest_angle(fly.orientation, fly.heading).abs();
            assert!(gap < 0.5, "orientation snapped away from heading by {gap}");
            if let Some(prev) = previous {
                let turn = shortest_angle(prev, fly.orientation).abs();
                assert!(turn < 0.1, "orientation jumped by {turn}");
            }
            previous = Some(fly.orientation);
        }
    }

    #[test]
    fn test_spawn_along_follows_direction() {
        let mut fx = engine();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(fx.spawn_along(
            EffectKind::Contrail,
            Vec2::new(400.0, 300.0),
            Vec2::new(-250.0, 40.0),
            &mut rng,
        ));
        let e = fx.iter().next().unwrap();
        let TransientEffect::Contrail(streak) = &e.effect else {
            panic!("expected contrail");
        };
        assert!(streak.velocity.x < 0.0);
        assert!(streak.velocity.y > 0.0);
        let band = EffectsConfig::default().contrail.speed;
        let speed = streak.velocity.length();
        assert!(speed >= band.0 - 1e-4 && speed <= band.1 + 1e-4);
    }

    #[test]
    fn test_spawn_along_ignores_tiny_direction() {
        let mut fx = engine();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let tiny = Vec2::splat(fx.velocity_epsilon() * 0.1);
        assert!(!fx.spawn_along(EffectKind::Contrail, Vec2::ZERO, tiny, &mut rng));
        assert!(fx.is_empty());
    }

    #[test]
    fn test_random_spawn_respects_bands() {
        let mut fx = engine();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let band = EffectsConfig::default().shooting_star.speed;
        for _ in 0..20 {
            fx.spawn(EffectKind::ShootingStar, Vec2::new(400.0, 300.0), &mut rng);
        }
        for e in fx.iter() {
            let TransientEffect::ShootingStar(s) = &e.effect else {
                panic!("expected shooting star");
            };
            let speed = s.velocity.length();
            assert!(speed >= band.0 - 1e-4 && speed <= band.1 + 1e-4);
            assert!(s.velocity.y > 0.0, "shooting stars fall");
        }
        fx.spawn(EffectKind::Butterfly, Vec2::ZERO, &mut rng);
        assert_eq!(fx.iter().last().unwrap().effect.kind(), EffectKind::Butterfly);
    }

    #[test]
    fn test_shortest_angle_wraps() {
        assert!((shortest_angle(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((shortest_angle(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
    }
}
