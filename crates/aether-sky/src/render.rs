//! Scene drawing.
//!
//! The renderer owns the canvas and nothing else. Each frame it consumes
//! the state produced by the other components and paints, back to front:
//! sky gradient, constellation edges, stars, clouds, transient effects.
//! Any single degenerate entity (non-finite geometry, non-positive alpha,
//! far outside the viewport) is skipped without affecting the rest.

use aether_config::ConstellationConfig;
use glam::{Vec2, Vec3, Vec4};

use crate::assets::AssetPool;
use crate::canvas::{BlendMode, Canvas, GradientStop, ImagePlacement};
use crate::color::{rgb8, with_alpha};
use crate::constellation::Connection;
use crate::effects::{ActiveEffect, Butterfly, EffectEngine, Streak, TransientEffect};
use crate::population::{Cloud, Star};
use crate::theme::SkyState;
use crate::viewport::Viewport;

/// Alpha below which a draw is skipped.
const MIN_ALPHA: f32 = 0.003;

/// Borrowed view of everything drawn in one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneFrame<'a> {
    /// Surface size.
    pub viewport: Viewport,
    /// Interpolated theme state.
    pub sky: &'a SkyState,
    /// Positioned stars.
    pub stars: &'a [Star],
    /// Constellation edges into `stars`.
    pub connections: &'a [Connection],
    /// Positioned clouds, far to near.
    pub clouds: &'a [Cloud],
    /// Cloud images.
    pub assets: &'a AssetPool,
    /// Live effects.
    pub effects: &'a EffectEngine,
    /// Edge styling.
    pub constellation: &'a ConstellationConfig,
    /// Edge length threshold of the current device class.
    pub link_threshold: f32,
    /// Cloud pulse swing.
    pub pulse_amplitude: f32,
    /// Scene time, seconds.
    pub time: f32,
}

/// Draws scenes onto a [`Canvas`].
#[derive(Debug)]
pub struct SceneRenderer<C: Canvas> {
    canvas: C,
}

impl<C: Canvas> SceneRenderer<C> {
    /// Take ownership of `canvas`.
    pub fn new(canvas: C) -> Self {
        Self { canvas }
    }

    /// The drawing surface.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Mutable access to the drawing surface.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Give the surface back.
    pub fn into_inner(self) -> C {
        self.canvas
    }

    /// Match the surface to `viewport`.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.canvas.size() != viewport.size() {
            self.canvas.resize(viewport.width, viewport.height);
        }
    }

    /// Paint a complete frame.
    pub fn render(&mut self, frame: &SceneFrame<'_>) {
        self.render_sky(frame.sky);
        let center = frame.viewport.center();
        self.render_constellations(frame, center);
        self.render_stars(frame.stars, frame.sky.star_visibility, center, frame.viewport);
        self.render_clouds(frame, center);
        self.render_effects(frame.effects, frame.viewport);
    }

    /// Vertical sky gradient.
    pub fn render_sky(&mut self, sky: &SkyState) {
        self.canvas
            .fill_vertical_gradient(sky.sky_top.extend(1.0), sky.sky_bottom.extend(1.0));
    }

    fn render_constellations(&mut self, frame: &SceneFrame<'_>, center: Vec2) {
        let visibility = frame.sky.star_visibility;
        if visibility <= 0.0 {
            return;
        }
        let color = rgb8(frame.constellation.color);
        let width = frame.constellation.line_width;
        let margin = frame.link_threshold.max(0.0);
        for edge in frame.connections {
            let (Some(a), Some(b)) = (frame.stars.get(edge.a), frame.stars.get(edge.b)) else {
                continue;
            };
            let alpha = edge.opacity * visibility;
            if !alpha.is_finite() || alpha <= MIN_ALPHA {
                continue;
            }
            let from = center + a.position;
            let to = center + b.position;
            if !frame.viewport.contains(from, margin) || !frame.viewport.contains(to, margin) {
                continue;
            }
            if !from.distance(to).is_finite() {
                continue;
            }
            self.canvas
                .stroke_line(from, to, width, with_alpha(color, alpha.min(1.0)));
        }
    }

    /// Stars with optional glow halos.
    pub fn render_stars(&mut self, stars: &[Star], visibility: f32, center: Vec2, viewport: Viewport) {
        if visibility <= 0.0 {
            return;
        }
        for star in stars {
            let alpha = star.opacity * visibility;
            if !alpha.is_finite() || alpha <= MIN_ALPHA {
                continue;
            }
            let radius = star.size * (0.6 + 0.4 * star.depth);
            let at = center + star.position;
            let halo = radius * (3.0 + 4.0 * star.glow_intensity);
            if !radius.is_finite() || radius <= 0.0 || !viewport.contains(at, halo) {
                continue;
            }
            if star.glow && star.glow_intensity > 0.0 {
                let stops = [
                    GradientStop::new(0.0, with_alpha(star.color, alpha * star.glow_intensity * 0.6)),
                    GradientStop::new(0.4, with_alpha(star.color, alpha * star.glow_intensity * 0.2)),
                    GradientStop::new(1.0, with_alpha(star.color, 0.0)),
                ];
                self.canvas.fill_radial_gradient(at, halo, &stops);
            }
            self.canvas
                .fill_circle(at, radius, with_alpha(star.color, alpha.min(1.0)));
        }
    }

    fn render_clouds(&mut self, frame: &SceneFrame<'_>, center: Vec2) {
        let sky = frame.sky;
        if sky.solid_cloud_visibility <= 0.0 && sky.hazy_cloud_visibility <= 0.0 {
            return;
        }
        for cloud in frame.clouds {
            let Some(image) = frame.assets.get(cloud.image) else {
                continue;
            };
            let visibility = if cloud.category.is_solid() {
                sky.solid_cloud_visibility
            } else {
                sky.hazy_cloud_visibility
            };
            let alpha = cloud.base_opacity * cloud.pulse(frame.time, frame.pulse_amplitude) * visibility;
            if !alpha.is_finite() || alpha <= MIN_ALPHA {
                continue;
            }
            let scale = cloud.scale * (0.7 + 0.3 * cloud.depth);
            let (w, h) = image.dimensions();
            let extent = w.max(h) as f32 * scale;
            let at = center + cloud.position;
            if !scale.is_finite() || scale <= 0.0 || !frame.viewport.contains(at, extent) {
                continue;
            }
            let placement = ImagePlacement {
                center: at,
                scale,
                rotation: cloud.rotation,
                flip_x: cloud.flipped,
                alpha: alpha.min(1.0),
            };
            self.canvas.draw_image(image, &placement, BlendMode::Screen);
        }
    }

    /// Transient effects, oldest first.
    pub fn render_effects(&mut self, effects: &EffectEngine, viewport: Viewport) {
        let epsilon = effects.velocity_epsilon();
        for effect in effects.iter() {
            if !effect.opacity.is_finite() || effect.opacity <= MIN_ALPHA {
                continue;
            }
            match &effect.effect {
                TransientEffect::ShootingStar(streak) | TransientEffect::Contrail(streak) => {
                    self.draw_streak(effect, streak, epsilon, viewport);
                }
                TransientEffect::Butterfly(fly) => self.draw_butterfly(effect, fly, viewport),
            }
        }
    }

    fn draw_streak(&mut self, effect: &ActiveEffect, streak: &Streak, epsilon: f32, viewport: Viewport) {
        let Some(direction) = streak.direction(epsilon) else {
            return;
        };
        let length = streak.trail_length * effect.scale;
        let thickness = streak.thickness * effect.scale;
        let head = effect.position;
        if !length.is_finite() || length <= 0.0 || !viewport.contains(head, length) {
            return;
        }
        let tail = head - direction * length;
        let opacity = effect.opacity.min(1.0);

        // Soft outer glow, tapered trail, bright core.
        self.canvas.stroke_tapered(
            tail,
            head,
            (0.0, thickness * 3.0),
            (
                with_alpha(streak.glow_color, 0.0),
                with_alpha(streak.glow_color, opacity * 0.25),
            ),
        );
        self.canvas.stroke_tapered(
            tail,
            head,
            (0.0, thickness),
            (
                with_alpha(streak.color, 0.0),
                with_alpha(streak.color, opacity * 0.8),
            ),
        );
        self.canvas.stroke_tapered(
            head - direction * length * 0.5,
            head,
            (0.0, thickness * 0.4),
            (with_alpha(Vec3::ONE, 0.0), with_alpha(Vec3::ONE, opacity)),
        );

        let head_alpha = effect.head_opacity().min(1.0);
        if head_alpha.is_finite() && head_alpha > MIN_ALPHA {
            let stops = [
                GradientStop::new(0.0, with_alpha(streak.color, head_alpha)),
                GradientStop::new(1.0, with_alpha(streak.glow_color, 0.0)),
            ];
            self.canvas.fill_radial_gradient(head, thickness * 2.5, &stops);
            self.canvas
                .fill_circle(head, thickness * 0.6, with_alpha(Vec3::ONE, head_alpha));
        }
    }

    fn draw_butterfly(&mut self, effect: &ActiveEffect, fly: &Butterfly, viewport: Viewport) {
        let span = fly.size * effect.scale;
        let at = effect.position;
        if !span.is_finite() || span <= 0.0 || !viewport.contains(at, span) {
            return;
        }
        let opacity = effect.opacity.min(1.0);
        let flap = 0.3 + 0.7 * fly.wing_phase.sin().abs();
        let forward = Vec2::from_angle(fly.orientation);
        let side = forward.perp();
        let wing = Vec2::new(span * 0.45, span * 0.3 * flap);
        let color: Vec4 = with_alpha(fly.color, opacity);
        for sign in [-1.0, 1.0] {
            let offset = side * sign * wing.y * 0.9;
            self.canvas
                .fill_ellipse(at + offset + forward * span * 0.12, wing, fly.orientation, color);
            self.canvas.fill_ellipse(
                at + offset * 0.8 - forward * span * 0.18,
                wing * 0.7,
                fly.orientation,
                color,
            );
        }
        self.canvas.fill_ellipse(
            at,
            Vec2::new(span * 0.35, span * 0.06),
            fly.orientation,
            with_alpha(Vec3::splat(0.12), opacity),
        );
    }
}
