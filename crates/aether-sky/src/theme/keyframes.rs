//! Piecewise-linear keyframe table over the theme scalar.

use aether_config::{KeyframeConfig, ThemeConfig};
use glam::Vec3;
use tracing::warn;

use crate::color::rgb8;

/// Visual state at one theme value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Theme scalar, `[0, 100]`.
    pub value: f32,
    /// Sky gradient top color.
    pub sky_top: Vec3,
    /// Sky gradient bottom color.
    pub sky_bottom: Vec3,
    /// Star visibility, `[0, 1]`.
    pub star_visibility: f32,
    /// Cloud visibility, `[0, 1]`.
    pub cloud_visibility: f32,
}

impl From<&KeyframeConfig> for Keyframe {
    fn from(k: &KeyframeConfig) -> Self {
        Self {
            value: k.value,
            sky_top: rgb8(k.sky_top),
            sky_bottom: rgb8(k.sky_bottom),
            star_visibility: k.star_visibility.clamp(0.0, 1.0),
            cloud_visibility: k.cloud_visibility.clamp(0.0, 1.0),
        }
    }
}

impl Keyframe {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self {
            value: mix(self.value, other.value),
            sky_top: self.sky_top.lerp(other.sky_top, t),
            sky_bottom: self.sky_bottom.lerp(other.sky_bottom, t),
            star_visibility: mix(self.star_visibility, other.star_visibility),
            cloud_visibility: mix(self.cloud_visibility, other.cloud_visibility),
        }
    }
}

/// Ordered breakpoints. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTable {
    frames: Vec<Keyframe>,
}

impl Default for KeyframeTable {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default().keyframes)
    }
}

impl KeyframeTable {
    /// Build a table from configuration, sorting by value.
    ///
    /// Non-finite breakpoints are dropped. An empty result falls back to the
    /// built-in table.
    pub fn from_config(frames: &[KeyframeConfig]) -> Self {
        let mut parsed: Vec<Keyframe> = frames
            .iter()
            .filter(|k| k.value.is_finite())
            .map(Keyframe::from)
            .collect();
        if parsed.is_empty() {
            warn!("Keyframe table is empty, using built-in table");
            parsed = ThemeConfig::default().keyframes.iter().map(Keyframe::from).collect();
        }
        parsed.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self { frames: parsed }
    }

    /// Breakpoints in ascending order.
    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    /// Visual state at `value`.
    ///
    /// Breakpoint values are returned exactly. Values outside the table clamp
    /// to its ends; `NaN` maps to the first breakpoint.
    pub fn interpolate(&self, value: f32) -> Keyframe {
        let first = self.frames[0];
        let last = self.frames[self.frames.len() - 1];
        if value.is_nan() || value <= first.value {
            return first;
        }
        if value >= last.value {
            return last;
        }
        for pair in self.frames.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if value == lo.value {
                return *lo;
            }
            if value == hi.value {
                return *hi;
            }
            if value > lo.value && value < hi.value {
                let t = (value - lo.value) / (hi.value - lo.value);
                let mut frame = lo.lerp(hi, t);
                frame.value = value;
                return frame;
            }
        }
        last
    }
}
