//! Depth-scaled rotation of the whole field around the viewport center.
//!
//! One global angle advances every frame. Each entity is rotated from its
//! *origin* by `angle * (depth_bias + depth * depth_span)`, so nearer
//! entities sweep faster. Origins are never written here; positions are
//! recomputed from scratch every frame and cannot accumulate error.

use aether_config::ParallaxConfig;
use glam::Vec2;

/// Anything placed in the rotating field.
pub trait Positioned {
    /// Unrotated position relative to the viewport center.
    fn origin(&self) -> Vec2;
    /// Depth in `(0, 1]`.
    fn depth(&self) -> f32;
    /// Store the rotated position.
    fn set_position(&mut self, position: Vec2);
}

/// Rotate `point` by `angle` radians around the origin.
pub fn rotate(point: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(point)
}

/// Global rotation state.
#[derive(Debug, Clone)]
pub struct ParallaxRotator {
    angle: f64,
    speed: f32,
    depth_bias: f32,
    depth_span: f32,
    pointer_bias: bool,
    bias_base: f32,
    bias_range: f32,
    bias_distance: f32,
}

impl ParallaxRotator {
    /// Create a rotator at angle 0.
    pub fn new(config: &ParallaxConfig) -> Self {
        Self {
            angle: 0.0,
            speed: config.speed,
            depth_bias: config.depth_bias,
            depth_span: config.depth_span,
            pointer_bias: config.pointer_bias,
            bias_base: config.bias_base,
            bias_range: config.bias_range,
            bias_distance: config.bias_distance.max(f32::EPSILON),
        }
    }

    /// Advance the global angle by one frame.
    pub fn advance(&mut self) {
        self.angle += f64::from(self.speed);
    }

    /// Current global angle, radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Signed per-frame increment.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Angle applied to an entity at `depth`.
    pub fn effective_angle(&self, depth: f32) -> f32 {
        (self.angle * f64::from(self.depth_bias + depth * self.depth_span)) as f32
    }

    /// Recompute every entity's position from its origin.
    pub fn apply<T: Positioned>(&self, entities: &mut [T]) {
        for entity in entities {
            let position = rotate(entity.origin(), self.effective_angle(entity.depth()));
            if position.is_finite() {
                entity.set_position(position);
            }
        }
    }

    /// Flip the spin direction.
    pub fn reverse(&mut self) {
        self.speed = -self.speed;
    }

    /// Spin clockwise for a positive `sign`, counter-clockwise for a negative
    /// one. Zero leaves the direction unchanged.
    pub fn set_direction(&mut self, sign: f32) {
        if sign != 0.0 && sign.signum() != self.speed.signum() {
            self.reverse();
        }
    }

    /// Scale spin magnitude by the pointer's distance from the center.
    ///
    /// No-op unless pointer bias is enabled. The sign of the spin is kept.
    pub fn bias_from_pointer(&mut self, offset_from_center: Vec2) {
        if !self.pointer_bias || !offset_from_center.is_finite() {
            return;
        }
        let influence = (offset_from_center.length() / self.bias_distance).min(1.0);
        let magnitude = self.bias_base + influence * self.bias_range;
        self.speed = magnitude.copysign(self.speed);
    }
}
