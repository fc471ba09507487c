//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Top-level scene configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Initial viewport settings.
    pub viewport: ViewportConfig,
    /// Mobile/desktop classification dials.
    pub device: DeviceConfig,
    /// Star population settings.
    pub stars: StarConfig,
    /// Constellation edge settings.
    pub constellation: ConstellationConfig,
    /// Cloud population settings.
    pub clouds: CloudConfig,
    /// Parallax rotation settings.
    pub parallax: ParallaxConfig,
    /// Transient effect physics.
    pub effects: EffectsConfig,
    /// Day/night transition settings.
    pub theme: ThemeConfig,
    /// Resize debounce settings.
    pub resize: ResizeConfig,
    /// Cloud image assets.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Resource class of the host device. Drives population density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Narrow or touch-first viewport, reduced populations.
    Mobile,
    /// Everything else.
    Desktop,
}

/// A value with one setting per [`DeviceClass`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerDevice<T> {
    /// Value on constrained viewports.
    pub mobile: T,
    /// Value on desktop viewports.
    pub desktop: T,
}

impl<T: Copy> PerDevice<T> {
    /// Pick the value for `class`.
    pub fn get(&self, class: DeviceClass) -> T {
        match class {
            DeviceClass::Mobile => self.mobile,
            DeviceClass::Desktop => self.desktop,
        }
    }
}

/// Viewport configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Whether the host reports touch input.
    pub touch_capable: bool,
}

/// Device classification dials. Width and touch capability are independent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Viewports this wide or narrower are treated as mobile.
    pub mobile_max_width: u32,
    /// Touch-capable hosts are treated as mobile regardless of width.
    pub touch_forces_mobile: bool,
}

impl DeviceConfig {
    /// Classify a viewport.
    pub fn classify(&self, width: u32, touch_capable: bool) -> DeviceClass {
        if width <= self.mobile_max_width || (touch_capable && self.touch_forces_mobile) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// One entry of the weighted star palette.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StarTypeConfig {
    /// Palette entry name, used in logs.
    pub name: String,
    /// Selection weight. Weights across the palette should sum to 1.
    pub weight: f32,
    /// Star color.
    pub color: [u8; 3],
    /// Whether stars of this type get a glow halo.
    pub glow: bool,
    /// Halo intensity in `[0, 1]`.
    pub glow_intensity: f32,
    /// Multiplier applied to the drawn size.
    pub size_boost: f32,
}

/// Star population configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarConfig {
    /// Total star count per device class.
    pub count: PerDevice<u32>,
    /// Field radius as a fraction of the larger viewport dimension.
    pub field_margin: f32,
    /// Share of stars scattered uniformly.
    pub scattered_fraction: f32,
    /// Share of stars placed in loose clusters. The remainder is faint background.
    pub cluster_fraction: f32,
    /// Inclusive range of cluster count.
    pub cluster_count: (u32, u32),
    /// Local jitter radius of a cluster, in pixels.
    pub cluster_radius: PerDevice<f32>,
    /// Positional jitter added to scattered stars, in pixels.
    pub position_jitter: f32,
    /// Size band of regular stars.
    pub size: (f32, f32),
    /// Size band of faint background stars.
    pub faint_size: (f32, f32),
    /// Radius band of faint stars, as a fraction of the field radius.
    pub faint_radius: (f32, f32),
    /// Base opacity band of regular stars.
    pub opacity: (f32, f32),
    /// Base opacity band of faint stars.
    pub faint_opacity: (f32, f32),
    /// Depth band. Must stay inside `(0, 1]`.
    pub depth: (f32, f32),
    /// Twinkle phase speed band, radians per second.
    pub twinkle_speed: (f32, f32),
    /// Minimum twinkle multiplier.
    pub twinkle_floor: f32,
    /// Twinkle swing added on top of the floor.
    pub twinkle_amplitude: f32,
    /// Weighted palette.
    pub palette: Vec<StarTypeConfig>,
}

/// Constellation edge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstellationConfig {
    /// Maximum original-space distance for an edge, per device class.
    pub threshold: PerDevice<f32>,
    /// Opacity scale `k` in `k * (1 - d / threshold)`.
    pub opacity_scale: f32,
    /// Smallest connected component whose edges survive.
    pub min_component_size: usize,
    /// Edge color.
    pub color: [u8; 3],
    /// Edge stroke width.
    pub line_width: f32,
}

/// Scale, opacity, and depth ranges of one cloud category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CloudCategoryConfig {
    /// Image scale band.
    pub scale: (f32, f32),
    /// Base opacity band.
    pub opacity: (f32, f32),
    /// Depth band.
    pub depth: (f32, f32),
}

/// Exponents applied to a visibility channel, one per transition direction.
///
/// An exponent below 1 keeps the channel high for longer, above 1 keeps it
/// low for longer. Endpoints 0 and 1 are unaffected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FadeCurve {
    /// Exponent while the scene moves toward day.
    pub to_day_exponent: f32,
    /// Exponent while the scene moves toward night.
    pub to_night_exponent: f32,
}

/// Cloud population configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CloudConfig {
    /// Field radius as a fraction of the larger viewport dimension.
    pub field_margin: f32,
    /// Inclusive range of tight cluster count.
    pub cluster_count: (u32, u32),
    /// Inclusive range of large sub-images per cluster.
    pub cluster_large: (u32, u32),
    /// Inclusive range of medium sub-images per cluster.
    pub cluster_medium: (u32, u32),
    /// Offset spread of large sub-images around the cluster center, in pixels.
    pub large_spread: f32,
    /// Offset spread of medium sub-images around the cluster center, in pixels.
    pub medium_spread: f32,
    /// Isolated drifting clouds per device class.
    pub isolated: PerDevice<u32>,
    /// Hazy fill clouds per device class.
    pub hazy: PerDevice<u32>,
    /// Distant fill clouds per device class.
    pub distant: PerDevice<u32>,
    /// Scale multiplier applied on mobile.
    pub mobile_scale: f32,
    /// Large cluster clouds.
    pub large: CloudCategoryConfig,
    /// Medium cluster clouds.
    pub medium: CloudCategoryConfig,
    /// Isolated mid-range clouds.
    pub isolated_category: CloudCategoryConfig,
    /// Hazy atmospheric fill.
    pub hazy_category: CloudCategoryConfig,
    /// Distant atmospheric fill.
    pub distant_category: CloudCategoryConfig,
    /// Drift speed band of isolated clouds, pixels per second.
    pub drift_speed: (f32, f32),
    /// Drift speed of cluster and fill clouds relative to isolated ones.
    pub background_drift_factor: f32,
    /// Maximum absolute image rotation, radians.
    pub max_rotation: f32,
    /// Pulse speed band, radians per second.
    pub pulse_speed: (f32, f32),
    /// Opacity swing of the pulse.
    pub pulse_amplitude: f32,
    /// Fade timing of solid (large, medium, isolated) clouds.
    #[serde(deserialize_with = "solid_fade_overlay")]
    pub solid_fade: FadeCurve,
    /// Fade timing of hazy and distant clouds.
    #[serde(deserialize_with = "hazy_fade_overlay")]
    pub hazy_fade: FadeCurve,
}

/// Parallax rotation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Global angle increment per frame, radians. The sign is the spin direction.
    pub speed: f32,
    /// Angular factor of the farthest entity.
    pub depth_bias: f32,
    /// Additional angular factor at depth 1.
    pub depth_span: f32,
    /// Let pointer distance from center set spin magnitude.
    pub pointer_bias: bool,
    /// Spin magnitude with the pointer at the center.
    pub bias_base: f32,
    /// Extra spin magnitude at full pointer influence.
    pub bias_range: f32,
    /// Pointer distance giving full influence, pixels.
    pub bias_distance: f32,
}

/// Streak (shooting star, contrail) physics and look.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StreakConfig {
    /// Launch speed band, pixels per frame.
    pub speed: (f32, f32),
    /// Launch angle band, radians (0 points right, positive points down).
    pub angle: (f32, f32),
    /// Life lost per frame.
    pub fade_rate: f32,
    /// Per-frame scale multiplier.
    pub scale_decay: f32,
    /// Scale never decays below this.
    pub scale_floor: f32,
    /// `life` exponent of the tail opacity.
    pub opacity_exponent: f32,
    /// `life` exponent of the head opacity. Higher than the tail's.
    pub head_exponent: f32,
    /// Trail length at scale 1, pixels.
    pub trail_length: f32,
    /// Trail thickness at scale 1, pixels.
    pub thickness: f32,
    /// Core color.
    pub color: [u8; 3],
    /// Outer glow color.
    pub glow_color: [u8; 3],
}

/// Butterfly physics and look.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ButterflyConfig {
    /// Cruise speed band, pixels per frame.
    pub speed: (f32, f32),
    /// Life lost per frame.
    pub fade_rate: f32,
    /// Per-frame scale multiplier.
    pub scale_decay: f32,
    /// Scale never decays below this.
    pub scale_floor: f32,
    /// `life` exponent of opacity.
    pub opacity_exponent: f32,
    /// Amplitude of the target heading oscillation, radians.
    pub wander_amplitude: f32,
    /// Phase advance of the target heading oscillation per frame.
    pub wander_rate: f32,
    /// Fraction of the heading error corrected per frame.
    pub steer_blend: f32,
    /// Perpendicular flutter amplitude, pixels.
    pub flutter_amplitude: f32,
    /// Flutter phase advance per frame.
    pub flutter_rate: f32,
    /// Wing beat phase advance per frame.
    pub wing_rate: f32,
    /// Fraction of the orientation error corrected per frame.
    pub turn_ease: f32,
    /// Wing span at scale 1, pixels.
    pub size: f32,
    /// Wing colors, one picked per butterfly.
    pub colors: Vec<[u8; 3]>,
}

/// Transient effect configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    /// Maximum simultaneously live effects. Oldest are dropped first.
    pub max_active: usize,
    /// Effects further off-screen than this are removed, pixels.
    pub offscreen_margin: f32,
    /// Streaks slower than this are removed.
    pub velocity_epsilon: f32,
    /// Shooting star settings.
    #[serde(deserialize_with = "shooting_star_overlay")]
    pub shooting_star: StreakConfig,
    /// Contrail settings.
    #[serde(deserialize_with = "contrail_overlay")]
    pub contrail: StreakConfig,
    /// Butterfly settings.
    pub butterfly: ButterflyConfig,
}

/// One breakpoint of the day/night keyframe table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct KeyframeConfig {
    /// Theme scalar of this breakpoint, `[0, 100]`.
    pub value: f32,
    /// Sky gradient top color.
    pub sky_top: [u8; 3],
    /// Sky gradient bottom color.
    pub sky_bottom: [u8; 3],
    /// Star visibility `[0, 1]`.
    pub star_visibility: f32,
    /// Cloud visibility `[0, 1]`.
    pub cloud_visibility: f32,
}

/// Day/night transition configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    /// Duration of a full dark-to-light transition, seconds.
    pub full_duration: f64,
    /// Key of the persisted theme label.
    pub storage_key: String,
    /// Theme used when nothing is persisted: `"light"` or `"dark"`.
    pub default_theme: String,
    /// Ordered keyframe table.
    pub keyframes: Vec<KeyframeConfig>,
    /// Star fade timing.
    #[serde(deserialize_with = "star_fade_overlay")]
    pub star_fade: FadeCurve,
    /// Host chrome color while dark.
    pub dark_color_hint: [u8; 3],
    /// Host chrome color while light.
    pub light_color_hint: [u8; 3],
    /// Length of an automatic day/night cycle, seconds. `None` disables it.
    pub cycle_seconds: Option<f64>,
}

/// Resize debounce configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResizeConfig {
    /// Quiet window before a resize is applied, seconds.
    pub debounce_seconds: f64,
    /// Size changes at or below this (pixels, per axis) do not regenerate.
    pub jitter_threshold: u32,
}

/// Cloud image asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Manifest file name, relative to `root`.
    pub manifest: String,
    /// Asset directory. `None` means the config directory.
    pub root: Option<String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Fixed RNG seed for reproducible renders.
    pub seed: Option<u64>,
}

// --- Default implementations ---

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            touch_capable: false,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mobile_max_width: 812,
            touch_forces_mobile: true,
        }
    }
}

fn star_type(
    name: &str,
    weight: f32,
    color: [u8; 3],
    glow_intensity: f32,
    size_boost: f32,
) -> StarTypeConfig {
    StarTypeConfig {
        name: name.to_string(),
        weight,
        color,
        glow: glow_intensity > 0.0,
        glow_intensity,
        size_boost,
    }
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: PerDevice {
                mobile: 180,
                desktop: 420,
            },
            field_margin: 0.8,
            scattered_fraction: 0.72,
            cluster_fraction: 0.18,
            cluster_count: (6, 8),
            cluster_radius: PerDevice {
                mobile: 45.0,
                desktop: 70.0,
            },
            position_jitter: 12.0,
            size: (0.6, 2.6),
            faint_size: (0.3, 0.8),
            faint_radius: (0.6, 1.1),
            opacity: (0.55, 1.0),
            faint_opacity: (0.12, 0.3),
            depth: (0.15, 1.0),
            twinkle_speed: (0.6, 2.2),
            twinkle_floor: 0.7,
            twinkle_amplitude: 0.3,
            palette: vec![
                star_type("white", 0.70, [255, 255, 255], 0.0, 1.0),
                star_type("blue", 0.12, [170, 200, 255], 0.4, 1.1),
                star_type("yellow", 0.09, [255, 232, 180], 0.3, 1.1),
                star_type("orange", 0.05, [255, 190, 140], 0.5, 1.2),
                star_type("beacon", 0.04, [255, 255, 255], 1.0, 1.6),
            ],
        }
    }
}

impl Default for ConstellationConfig {
    fn default() -> Self {
        Self {
            threshold: PerDevice {
                mobile: 85.0,
                desktop: 120.0,
            },
            opacity_scale: 0.22,
            min_component_size: 3,
            color: [100, 181, 246],
            line_width: 0.8,
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            field_margin: 0.8,
            cluster_count: (2, 3),
            cluster_large: (1, 2),
            cluster_medium: (3, 5),
            large_spread: 40.0,
            medium_spread: 90.0,
            isolated: PerDevice {
                mobile: 3,
                desktop: 6,
            },
            hazy: PerDevice {
                mobile: 7,
                desktop: 14,
            },
            distant: PerDevice {
                mobile: 9,
                desktop: 18,
            },
            mobile_scale: 0.7,
            large: CloudCategoryConfig {
                scale: (0.9, 1.3),
                opacity: (0.75, 0.95),
                depth: (0.75, 1.0),
            },
            medium: CloudCategoryConfig {
                scale: (0.5, 0.8),
                opacity: (0.6, 0.85),
                depth: (0.6, 0.9),
            },
            isolated_category: CloudCategoryConfig {
                scale: (0.4, 0.7),
                opacity: (0.5, 0.75),
                depth: (0.4, 0.7),
            },
            hazy_category: CloudCategoryConfig {
                scale: (0.8, 1.6),
                opacity: (0.12, 0.25),
                depth: (0.2, 0.5),
            },
            distant_category: CloudCategoryConfig {
                scale: (0.25, 0.45),
                opacity: (0.15, 0.3),
                depth: (0.05, 0.3),
            },
            drift_speed: (2.0, 7.0),
            background_drift_factor: 0.3,
            max_rotation: 0.35,
            pulse_speed: (0.2, 0.6),
            pulse_amplitude: 0.06,
            solid_fade: FadeCurve::new(1.7, 0.6),
            hazy_fade: FadeCurve::new(1.0, 1.25),
        }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            speed: 0.0004,
            depth_bias: 0.35,
            depth_span: 0.65,
            pointer_bias: false,
            bias_base: 0.001,
            bias_range: 0.003,
            bias_distance: 200.0,
        }
    }
}

impl Default for ButterflyConfig {
    fn default() -> Self {
        Self {
            speed: (0.8, 1.6),
            fade_rate: 0.004,
            scale_decay: 0.999,
            scale_floor: 0.7,
            opacity_exponent: 0.8,
            wander_amplitude: 1.1,
            wander_rate: 0.03,
            steer_blend: 0.04,
            flutter_amplitude: 1.4,
            flutter_rate: 0.35,
            wing_rate: 0.45,
            turn_ease: 0.12,
            size: 9.0,
            colors: vec![[255, 170, 60], [120, 170, 255], [250, 235, 120], [240, 130, 200]],
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            max_active: 24,
            offscreen_margin: 150.0,
            velocity_epsilon: 1e-3,
            shooting_star: StreakConfig::shooting_star(),
            contrail: StreakConfig::contrail(),
            butterfly: ButterflyConfig::default(),
        }
    }
}

fn keyframe(
    value: f32,
    sky_top: [u8; 3],
    sky_bottom: [u8; 3],
    star_visibility: f32,
    cloud_visibility: f32,
) -> KeyframeConfig {
    KeyframeConfig {
        value,
        sky_top,
        sky_bottom,
        star_visibility,
        cloud_visibility,
    }
}

impl FadeCurve {
    /// Curve with the given exponents.
    pub const fn new(to_day_exponent: f32, to_night_exponent: f32) -> Self {
        Self {
            to_day_exponent,
            to_night_exponent,
        }
    }
}

impl StreakConfig {
    /// Fast, short-lived night streak.
    pub fn shooting_star() -> Self {
        Self {
            speed: (6.0, 11.0),
            angle: (0.35, 1.0),
            fade_rate: 0.018,
            scale_decay: 0.992,
            scale_floor: 0.35,
            opacity_exponent: 1.4,
            head_exponent: 2.5,
            trail_length: 140.0,
            thickness: 2.2,
            color: [255, 255, 255],
            glow_color: [160, 200, 255],
        }
    }

    /// Slow, long day streak.
    pub fn contrail() -> Self {
        Self {
            speed: (1.8, 3.0),
            angle: (-0.15, 0.15),
            fade_rate: 0.006,
            scale_decay: 0.998,
            scale_floor: 0.6,
            opacity_exponent: 1.1,
            head_exponent: 1.8,
            trail_length: 260.0,
            thickness: 3.5,
            color: [255, 255, 255],
            glow_color: [220, 230, 245],
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            full_duration: 1.2,
            storage_key: "theme".to_string(),
            default_theme: "dark".to_string(),
            keyframes: vec![
                keyframe(0.0, [5, 8, 22], [18, 24, 52], 1.0, 0.0),
                keyframe(25.0, [25, 30, 70], [70, 60, 110], 0.8, 0.1),
                keyframe(50.0, [70, 90, 150], [180, 150, 150], 0.45, 0.4),
                keyframe(75.0, [110, 160, 215], [215, 200, 200], 0.15, 0.7),
                keyframe(100.0, [135, 195, 240], [225, 238, 250], 0.0, 1.0),
            ],
            star_fade: FadeCurve::new(0.55, 1.8),
            dark_color_hint: [11, 16, 38],
            light_color_hint: [188, 220, 245],
            cycle_seconds: None,
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            debounce_seconds: 0.25,
            jitter_threshold: 40,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            manifest: "clouds.ron".to_string(),
            root: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

// --- Partial overrides ---
//
// `FadeCurve` and `StreakConfig` have more than one default, so a partially
// written section is laid over the default of the field it fills.

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
struct FadeCurveOverlay {
    #[serde(default, deserialize_with = "present")]
    to_day_exponent: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    to_night_exponent: Option<f32>,
}

impl FadeCurveOverlay {
    fn over(self, base: FadeCurve) -> FadeCurve {
        FadeCurve {
            to_day_exponent: self.to_day_exponent.unwrap_or(base.to_day_exponent),
            to_night_exponent: self.to_night_exponent.unwrap_or(base.to_night_exponent),
        }
    }
}

#[derive(Deserialize)]
struct StreakOverlay {
    #[serde(default, deserialize_with = "present")]
    speed: Option<(f32, f32)>,
    #[serde(default, deserialize_with = "present")]
    angle: Option<(f32, f32)>,
    #[serde(default, deserialize_with = "present")]
    fade_rate: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    scale_decay: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    scale_floor: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    opacity_exponent: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    head_exponent: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    trail_length: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    thickness: Option<f32>,
    #[serde(default, deserialize_with = "present")]
    color: Option<[u8; 3]>,
    #[serde(default, deserialize_with = "present")]
    glow_color: Option<[u8; 3]>,
}

impl StreakOverlay {
    fn over(self, base: StreakConfig) -> StreakConfig {
        StreakConfig {
            speed: self.speed.unwrap_or(base.speed),
            angle: self.angle.unwrap_or(base.angle),
            fade_rate: self.fade_rate.unwrap_or(base.fade_rate),
            scale_decay: self.scale_decay.unwrap_or(base.scale_decay),
            scale_floor: self.scale_floor.unwrap_or(base.scale_floor),
            opacity_exponent: self.opacity_exponent.unwrap_or(base.opacity_exponent),
            head_exponent: self.head_exponent.unwrap_or(base.head_exponent),
            trail_length: self.trail_length.unwrap_or(base.trail_length),
            thickness: self.thickness.unwrap_or(base.thickness),
            color: self.color.unwrap_or(base.color),
            glow_color: self.glow_color.unwrap_or(base.glow_color),
        }
    }
}

fn solid_fade_overlay<'de, D: Deserializer<'de>>(d: D) -> Result<FadeCurve, D::Error> {
    Ok(FadeCurveOverlay::deserialize(d)?.over(CloudConfig::default().solid_fade))
}

fn hazy_fade_overlay<'de, D: Deserializer<'de>>(d: D) -> Result<FadeCurve, D::Error> {
    Ok(FadeCurveOverlay::deserialize(d)?.over(CloudConfig::default().hazy_fade))
}

fn star_fade_overlay<'de, D: Deserializer<'de>>(d: D) -> Result<FadeCurve, D::Error> {
    Ok(FadeCurveOverlay::deserialize(d)?.over(ThemeConfig::default().star_fade))
}

fn shooting_star_overlay<'de, D: Deserializer<'de>>(d: D) -> Result<StreakConfig, D::Error> {
    Ok(StreakOverlay::deserialize(d)?.over(StreakConfig::shooting_star()))
}

fn contrail_overlay<'de, D: Deserializer<'de>>(d: D) -> Result<StreakConfig, D::Error> {
    Ok(StreakOverlay::deserialize(d)?.over(StreakConfig::contrail()))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Device class of the configured viewport.
    pub fn device_class(&self) -> DeviceClass {
        self.device
            .classify(self.viewport.width, self.viewport.touch_capable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("storage_key: \"theme\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `clouds` section entirely
        let ron_str = "(viewport: (), stars: (), theme: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.clouds, CloudConfig::default());
    }

    #[test]
    fn test_partial_fade_curve_keeps_other_exponent() {
        let ron_str = "(theme: (star_fade: (to_day_exponent: 0.5)), clouds: (hazy_fade: ()))";
        let config: Config = ron::from_str(ron_str).unwrap();
        let defaults = Config::default();
        assert_eq!(config.theme.star_fade.to_day_exponent, 0.5);
        assert_eq!(
            config.theme.star_fade.to_night_exponent,
            defaults.theme.star_fade.to_night_exponent
        );
        assert_eq!(config.clouds.hazy_fade, defaults.clouds.hazy_fade);
        assert_eq!(config.clouds.solid_fade, defaults.clouds.solid_fade);
    }

    #[test]
    fn test_partial_streak_fills_from_its_own_default() {
        let ron_str = "(effects: (contrail: (thickness: 5.0), shooting_star: (speed: (2.0, 3.0))))";
        let config: Config = ron::from_str(ron_str).unwrap();
        let contrail = StreakConfig {
            thickness: 5.0,
            ..StreakConfig::contrail()
        };
        let shooting_star = StreakConfig {
            speed: (2.0, 3.0),
            ..StreakConfig::shooting_star()
        };
        assert_eq!(config.effects.contrail, contrail);
        assert_eq!(config.effects.shooting_star, shooting_star);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.viewport.width = 1920;
        config.viewport.height = 1080;
        config.debug.seed = Some(7);
        config.theme.cycle_seconds = Some(90.0);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.parallax.speed = -0.001;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().parallax.speed, -0.001);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_device_dials_are_independent() {
        let device = DeviceConfig::default();
        assert_eq!(device.classify(800, false), DeviceClass::Mobile);
        assert_eq!(device.classify(1920, false), DeviceClass::Desktop);
        assert_eq!(device.classify(1920, true), DeviceClass::Mobile);

        let relaxed = DeviceConfig {
            touch_forces_mobile: false,
            ..DeviceConfig::default()
        };
        assert_eq!(relaxed.classify(1920, true), DeviceClass::Desktop);
    }

    #[test]
    fn test_default_palette_weights_sum_to_one() {
        let sum: f32 = StarConfig::default().palette.iter().map(|t| t.weight).sum();
        assert!((sum - 1.0).abs() < 1e-4, "palette weights sum to {sum}");
    }

    #[test]
    fn test_default_keyframes_are_ordered() {
        let frames = ThemeConfig::default().keyframes;
        assert_eq!(frames.first().map(|k| k.value), Some(0.0));
        assert_eq!(frames.last().map(|k| k.value), Some(100.0));
        for pair in frames.windows(2) {
            assert!(pair[0].value < pair[1].value);
        }
    }
}
