//! Starfield generation: scattered, clustered, and faint background stars.

use std::f32::consts::TAU;

use aether_config::{DeviceClass, StarConfig, StarTypeConfig};
use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::debug;

use super::{clamp_depth, disc_offset, sample, sample_count};
use crate::color::rgb8;
use crate::parallax::Positioned;
use crate::viewport::Viewport;
use crate::weighted;

/// A single star.
///
/// Everything except `position` and `opacity` is fixed at generation;
/// those two are derived every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Generated position relative to the viewport center.
    pub origin: Vec2,
    /// Rotated position relative to the viewport center.
    pub position: Vec2,
    /// Base radius in pixels.
    pub size: f32,
    /// Depth in `(0, 1]`. Higher is nearer: faster, bigger, brighter.
    pub depth: f32,
    /// Star color.
    pub color: Vec3,
    /// Whether a glow halo is drawn.
    pub glow: bool,
    /// Halo intensity in `[0, 1]`.
    pub glow_intensity: f32,
    /// Opacity before twinkle and visibility.
    pub base_opacity: f32,
    /// Opacity of the current frame.
    pub opacity: f32,
    /// Twinkle phase speed, radians per second.
    pub twinkle_speed: f32,
    /// Twinkle phase offset.
    pub twinkle_phase: f32,
    /// Faint background star, never part of a constellation.
    pub faint: bool,
}

impl Star {
    /// Recompute `opacity` for scene time `time` (seconds).
    pub fn twinkle(&mut self, time: f32, floor: f32, amplitude: f32) {
        let swing = (time * self.twinkle_speed + self.twinkle_phase).sin();
        let depth_brightness = 0.5 + 0.5 * self.depth;
        self.opacity = (self.base_opacity * (floor + amplitude * swing) * depth_brightness)
            .clamp(0.0, 1.0);
    }
}

impl Positioned for Star {
    fn origin(&self) -> Vec2 {
        self.origin
    }

    fn depth(&self) -> f32 {
        self.depth
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

static FALLBACK_TYPE: StarTypeConfig = StarTypeConfig {
    name: String::new(),
    weight: 1.0,
    color: [255, 255, 255],
    glow: false,
    glow_intensity: 0.0,
    size_boost: 1.0,
};

fn pick_type<'a, R: Rng + ?Sized>(palette: &'a [StarTypeConfig], rng: &mut R) -> &'a StarTypeConfig {
    let weights: Vec<f32> = palette.iter().map(|t| t.weight).collect();
    weighted::pick_index(&weights, rng)
        .and_then(|i| palette.get(i))
        .unwrap_or(&FALLBACK_TYPE)
}

/// Skewed size: the product of two uniform draws keeps most stars small.
fn skewed_size<R: Rng + ?Sized>(rng: &mut R, band: (f32, f32)) -> f32 {
    let skew = rng.random::<f32>() * rng.random::<f32>();
    band.0 + (band.1 - band.0).max(0.0) * skew
}

fn make_star<R: Rng + ?Sized>(
    config: &StarConfig,
    origin: Vec2,
    faint: bool,
    rng: &mut R,
) -> Star {
    let kind = pick_type(&config.palette, rng);
    let (size, base_opacity, glow) = if faint {
        (
            sample(rng, config.faint_size),
            sample(rng, config.faint_opacity),
            false,
        )
    } else {
        (
            skewed_size(rng, config.size) * kind.size_boost,
            sample(rng, config.opacity),
            kind.glow,
        )
    };
    Star {
        origin,
        position: origin,
        size,
        depth: clamp_depth(sample(rng, config.depth)),
        color: rgb8(kind.color),
        glow,
        glow_intensity: if glow { kind.glow_intensity } else { 0.0 },
        base_opacity,
        opacity: base_opacity,
        twinkle_speed: sample(rng, config.twinkle_speed),
        twinkle_phase: rng.random::<f32>() * TAU,
        faint,
    }
}

/// Split `total` into (scattered, clustered, faint) counts.
fn split_counts(config: &StarConfig, total: u32) -> (u32, u32, u32) {
    let scattered = ((total as f32 * config.scattered_fraction).round() as u32).min(total);
    let clustered =
        ((total as f32 * config.cluster_fraction).round() as u32).min(total - scattered);
    (scattered, clustered, total - scattered - clustered)
}

/// Generate the full starfield for `viewport`.
///
/// The total count comes from the device class; it is split between
/// uniformly scattered stars, a handful of loose clusters, and faint
/// background stars placed further out.
pub fn generate_stars<R: Rng + ?Sized>(
    config: &StarConfig,
    viewport: Viewport,
    class: DeviceClass,
    rng: &mut R,
) -> Vec<Star> {
    let total = config.count.get(class);
    let (scattered, clustered, faint) = split_counts(config, total);
    let field = viewport.max_dimension() * config.field_margin;
    let mut stars = Vec::with_capacity(total as usize);

    for _ in 0..scattered {
        let angle = rng.random::<f32>() * TAU;
        let radius = field * rng.random::<f32>().sqrt();
        let jitter = Vec2::new(
            sample(rng, (-config.position_jitter, config.position_jitter)),
            sample(rng, (-config.position_jitter, config.position_jitter)),
        );
        let origin = Vec2::from_angle(angle) * radius + jitter;
        stars.push(make_star(config, origin, false, rng));
    }

    if clustered > 0 {
        let cluster_count = sample_count(rng, config.cluster_count).max(1);
        let centers: Vec<Vec2> = (0..cluster_count)
            .map(|_| {
                let angle = rng.random::<f32>() * TAU;
                Vec2::from_angle(angle) * field * sample(rng, (0.15, 0.75))
            })
            .collect();
        let local_radius = config.cluster_radius.get(class);
        for i in 0..clustered as usize {
            let center = centers[i % centers.len()];
            let origin = center + disc_offset(rng, local_radius);
            stars.push(make_star(config, origin, false, rng));
        }
    }

    for _ in 0..faint {
        let angle = rng.random::<f32>() * TAU;
        let radius = field * sample(rng, config.faint_radius);
        stars.push(make_star(config, Vec2::from_angle(angle) * radius, true, rng));
    }

    debug!(
        total,
        scattered,
        clustered,
        faint,
        ?class,
        "Generated starfield"
    );
    stars
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generate(width: u32, height: u32, class: DeviceClass, seed: u64) -> Vec<Star> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_stars(
            &StarConfig::default(),
            Viewport::new(width, height),
            class,
            &mut rng,
        )
    }

    #[test]
    fn test_count_follows_device_class() {
        let config = StarConfig::default();
        assert_eq!(
            generate(1920, 1080, DeviceClass::Desktop, 1).len(),
            config.count.desktop as usize
        );
        assert_eq!(
            generate(400, 800, DeviceClass::Mobile, 1).len(),
            config.count.mobile as usize
        );
    }

    #[test]
    fn test_split_proportions() {
        let config = StarConfig::default();
        let (scattered, clustered, faint) = split_counts(&config, 420);
        assert_eq!(scattered + clustered + faint, 420);
        assert!((0.70..=0.75).contains(&(scattered as f32 / 420.0)));
        assert!((0.15..=0.20).contains(&(clustered as f32 / 420.0)));
        assert!((0.05..=0.10).contains(&(faint as f32 / 420.0)));
    }

    #[test]
    fn test_faint_stars_are_flagged_and_dim() {
        let config = StarConfig::default();
        let stars = generate(1920, 1080, DeviceClass::Desktop, 2);
        let faint: Vec<&Star> = stars.iter().filter(|s| s.faint).collect();
        assert!(!faint.is_empty());
        for star in faint {
            assert!(star.base_opacity <= config.faint_opacity.1);
            assert!(star.size <= config.faint_size.1);
            assert!(!star.glow);
        }
    }

    #[test]
    fn test_depth_in_unit_interval() {
        for star in generate(1280, 720, DeviceClass::Desktop, 3) {
            assert!(star.depth > 0.0 && star.depth <= 1.0, "depth {}", star.depth);
        }
    }

    #[test]
    fn test_field_outgrows_viewport() {
        let stars = generate(1920, 1080, DeviceClass::Desktop, 4);
        let farthest = stars
            .iter()
            .map(|s| s.origin.length())
            .fold(0.0_f32, f32::max);
        // Half-diagonal of the viewport must be covered so rotation shows no edge.
        let half_diagonal = Vec2::new(960.0, 540.0).length();
        assert!(
            farthest > half_diagonal,
            "farthest star {farthest} inside half-diagonal {half_diagonal}"
        );
    }

    #[test]
    fn test_sizes_skew_small() {
        let stars = generate(1920, 1080, DeviceClass::Desktop, 5);
        let config = StarConfig::default();
        let midpoint = (config.size.0 + config.size.1) / 2.0;
        let small = stars
            .iter()
            .filter(|s| !s.faint && s.size < midpoint)
            .count();
        let regular = stars.iter().filter(|s| !s.faint).count();
        assert!(
            small * 2 > regular,
            "most regular stars should be below the band midpoint ({small}/{regular})"
        );
    }

    #[test]
    fn test_twinkle_stays_in_range() {
        let mut star = generate(800, 600, DeviceClass::Mobile, 6).remove(0);
        for step in 0..200 {
            star.twinkle(step as f32 * 0.05, 0.7, 0.3);
            assert!((0.0..=1.0).contains(&star.opacity));
        }
    }

    #[test]
    fn test_empty_palette_falls_back_to_white() {
        let config = StarConfig {
            palette: Vec::new(),
            ..StarConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let stars = generate_stars(&config, Viewport::new(800, 600), DeviceClass::Mobile, &mut rng);
        assert!(stars.iter().all(|s| s.color == Vec3::ONE));
    }
}
