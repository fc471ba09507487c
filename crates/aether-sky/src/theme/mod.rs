//! Day/night theme: the 0..=100 scalar, its keyframe table, the eased
//! transition controller, the optional automatic cycle, and persistence
//! of the chosen label.

mod controller;
mod cycle;
mod keyframes;
mod store;

use aether_config::{CloudConfig, FadeCurve, ThemeConfig};
use glam::Vec3;

pub use controller::{IconState, ThemeController, TransitionHandle};
pub use cycle::DayNightCycle;
pub use keyframes::{Keyframe, KeyframeTable};
pub use store::{MemoryStore, StoreError, ThemeStore, load_theme, persist_theme};

/// Theme scalar of full dark.
pub const DARK_VALUE: f32 = 0.0;
/// Theme scalar of full light.
pub const LIGHT_VALUE: f32 = 100.0;
/// The persisted label flips when the scalar crosses this.
pub const MIDPOINT: f32 = 50.0;

/// Discrete theme label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Night sky, value 0.
    Dark,
    /// Day sky, value 100.
    Light,
}

impl Theme {
    /// Persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Parse a persisted label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Scalar this theme rests at.
    pub fn value(self) -> f32 {
        match self {
            Self::Dark => DARK_VALUE,
            Self::Light => LIGHT_VALUE,
        }
    }

    /// The other theme.
    pub fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Side of the midpoint `value` lies on. Exactly 50 keeps `current`.
    pub fn for_value(value: f32, current: Self) -> Self {
        if value > MIDPOINT {
            Self::Light
        } else if value < MIDPOINT {
            Self::Dark
        } else {
            current
        }
    }
}

/// Which way the scalar is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Rising toward 100.
    TowardDay,
    /// Falling toward 0.
    TowardNight,
}

impl Direction {
    /// Direction of travel from `from` to `to`. Equal values count as toward day.
    pub fn between(from: f32, to: f32) -> Self {
        if to < from {
            Self::TowardNight
        } else {
            Self::TowardDay
        }
    }
}

/// How the scene derives its theme scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMode {
    /// Explicit light/dark theme with eased transitions between them.
    Discrete,
    /// Automatic time-of-day cycle.
    Continuous,
}

/// Apply the direction-dependent easing of one visibility channel.
pub fn fade(visibility: f32, curve: &FadeCurve, direction: Direction) -> f32 {
    let exponent = match direction {
        Direction::TowardDay => curve.to_day_exponent,
        Direction::TowardNight => curve.to_night_exponent,
    };
    let v = visibility.clamp(0.0, 1.0);
    if exponent.is_finite() && exponent > 0.0 {
        v.powf(exponent)
    } else {
        v
    }
}

/// Everything the renderer needs from the theme for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyState {
    /// Theme scalar.
    pub value: f32,
    /// Direction of the last movement.
    pub direction: Direction,
    /// Sky gradient top color.
    pub sky_top: Vec3,
    /// Sky gradient bottom color.
    pub sky_bottom: Vec3,
    /// Star visibility after easing.
    pub star_visibility: f32,
    /// Visibility of large, medium and isolated clouds after easing.
    pub solid_cloud_visibility: f32,
    /// Visibility of hazy and distant clouds after easing.
    pub hazy_cloud_visibility: f32,
}

impl SkyState {
    /// Sample the keyframe table at `value` and ease each channel.
    pub fn resolve(
        table: &KeyframeTable,
        value: f32,
        direction: Direction,
        theme: &ThemeConfig,
        clouds: &CloudConfig,
    ) -> Self {
        let frame = table.interpolate(value);
        Self {
            value,
            direction,
            sky_top: frame.sky_top,
            sky_bottom: frame.sky_bottom,
            star_visibility: fade(frame.star_visibility, &theme.star_fade, direction),
            solid_cloud_visibility: fade(frame.cloud_visibility, &clouds.solid_fade, direction),
            hazy_cloud_visibility: fade(frame.cloud_visibility, &clouds.hazy_fade, direction),
        }
    }
}
