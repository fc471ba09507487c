//! Image-based cloud field: tight clusters, isolated drifters, and
//! low-opacity atmospheric fill.

use std::f32::consts::TAU;

use aether_config::{CloudCategoryConfig, CloudConfig, DeviceClass};
use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use super::{clamp_depth, disc_offset, sample, sample_count};
use crate::assets::{AssetPool, CloudSet, ImageId};
use crate::parallax::Positioned;
use crate::viewport::Viewport;

/// Placement category of a cloud. Fixes its ranges and fade timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudCategory {
    /// Dominant sub-image of a tight cluster.
    Large,
    /// Smaller sub-image bunched around a cluster.
    Medium,
    /// Mid-range cloud drifting on its own.
    Isolated,
    /// Wide, faint atmospheric fill.
    Hazy,
    /// Small, far-away fill.
    Distant,
}

impl CloudCategory {
    /// Art family the category draws from.
    pub fn image_set(self) -> CloudSet {
        match self {
            Self::Large | Self::Medium | Self::Isolated => CloudSet::Cumulus,
            Self::Hazy | Self::Distant => CloudSet::Wisp,
        }
    }

    /// Solid clouds fade on a different curve than hazy fill.
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Large | Self::Medium | Self::Isolated)
    }

    fn ranges(self, config: &CloudConfig) -> &CloudCategoryConfig {
        match self {
            Self::Large => &config.large,
            Self::Medium => &config.medium,
            Self::Isolated => &config.isolated_category,
            Self::Hazy => &config.hazy_category,
            Self::Distant => &config.distant_category,
        }
    }
}

/// One cloud image placed in the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    /// Position relative to the viewport center before rotation. Moves only by drift.
    pub origin: Vec2,
    /// Rotated position relative to the viewport center.
    pub position: Vec2,
    /// Source image.
    pub image: ImageId,
    /// Placement category.
    pub category: CloudCategory,
    /// Image scale.
    pub scale: f32,
    /// Opacity before pulse and visibility.
    pub base_opacity: f32,
    /// Depth in `(0, 1]`.
    pub depth: f32,
    /// Image rotation, radians.
    pub rotation: f32,
    /// Mirrored horizontally.
    pub flipped: bool,
    /// Drift velocity of `origin`, pixels per second.
    pub drift: Vec2,
    /// Pulse phase offset.
    pub pulse_phase: f32,
    /// Pulse speed, radians per second.
    pub pulse_speed: f32,
}

impl Cloud {
    /// Creep `origin` by `dt` seconds of drift.
    ///
    /// A cloud leaving the field of radius `field` re-enters from the
    /// opposite side, still outside the viewport and now drifting inward.
    pub fn drift_by(&mut self, dt: f32, field: f32) {
        let next = self.origin + self.drift * dt;
        if !next.is_finite() {
            return;
        }
        self.origin = if field > 0.0 && next.length() > field {
            -next.clamp_length_max(field)
        } else {
            next
        };
    }

    /// Opacity multiplier of the slow breathing pulse at scene time `time`.
    pub fn pulse(&self, time: f32, amplitude: f32) -> f32 {
        1.0 + amplitude * (time * self.pulse_speed + self.pulse_phase).sin()
    }
}

impl Positioned for Cloud {
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

struct Placer<'a, R: Rng + ?Sized> {
    config: &'a CloudConfig,
    pool: &'a AssetPool,
    rng: &'a mut R,
    scale_factor: f32,
    clouds: Vec<Cloud>,
}

impl<R: Rng + ?Sized> Placer<'_, R> {
    fn place(&mut self, category: CloudCategory, origin: Vec2, drift: Vec2) -> bool {
        let Some(image) = self.pool.pick(category.image_set(), self.rng) else {
            return false;
        };
        let ranges = *category.ranges(self.config);
        let max_rotation = self.config.max_rotation;
        let cloud = Cloud {
            origin,
            position: origin,
            image,
            category,
            scale: sample(self.rng, ranges.scale) * self.scale_factor,
            base_opacity: sample(self.rng, ranges.opacity),
            depth: clamp_depth(sample(self.rng, ranges.depth)),
            rotation: sample(self.rng, (-max_rotation, max_rotation)),
            flipped: self.rng.random::<bool>(),
            drift,
            pulse_phase: self.rng.random::<f32>() * TAU,
            pulse_speed: sample(self.rng, self.config.pulse_speed),
        };
        self.clouds.push(cloud);
        true
    }

    fn drift(&mut self, factor: f32) -> Vec2 {
        let heading = self.rng.random::<f32>() * TAU;
        Vec2::from_angle(heading) * sample(self.rng, self.config.drift_speed) * factor
    }

    fn polar(&mut self, field: f32, band: (f32, f32)) -> Vec2 {
        let angle = self.rng.random::<f32>() * TAU;
        Vec2::from_angle(angle) * field * sample(self.rng, band)
    }
}

/// Radius of the cloud field around the viewport center.
pub fn field_radius(config: &CloudConfig, viewport: Viewport) -> f32 {
    viewport.max_dimension() * config.field_margin
}

/// Generate the cloud field for `viewport` from the loaded images in `pool`.
///
/// Returns an empty field while the pool is still waiting on results.
/// Categories whose art family has no loaded image are skipped. The result
/// is sorted by ascending depth so it can be painted in order.
pub fn generate_clouds<R: Rng + ?Sized>(
    config: &CloudConfig,
    viewport: Viewport,
    class: DeviceClass,
    pool: &AssetPool,
    rng: &mut R,
) -> Vec<Cloud> {
    if !pool.is_complete() {
        debug!(
            "Cloud generation deferred, {} asset results outstanding",
            pool.settled_count()
        );
        return Vec::new();
    }

    let field = field_radius(config, viewport);
    let scale_factor = match class {
        DeviceClass::Mobile => config.mobile_scale,
        DeviceClass::Desktop => 1.0,
    };
    let background = config.background_drift_factor;
    let mut placer = Placer {
        config,
        pool,
        rng,
        scale_factor,
        clouds: Vec::new(),
    };

    let clusters = sample_count(placer.rng, config.cluster_count);
    let mut skipped = 0u32;
    for _ in 0..clusters {
        let center = placer.polar(field, (0.2, 0.7));
        let drift = placer.drift(background);
        for _ in 0..sample_count(placer.rng, config.cluster_large) {
            let origin = center + disc_offset(placer.rng, config.large_spread);
            skipped += u32::from(!placer.place(CloudCategory::Large, origin, drift));
        }
        for _ in 0..sample_count(placer.rng, config.cluster_medium) {
            let origin = center + disc_offset(placer.rng, config.medium_spread);
            skipped += u32::from(!placer.place(CloudCategory::Medium, origin, drift));
        }
    }

    for _ in 0..config.isolated.get(class) {
        let origin = placer.polar(field, (0.25, 0.9));
        let drift = placer.drift(1.0);
        skipped += u32::from(!placer.place(CloudCategory::Isolated, origin, drift));
    }

    for (category, count) in [
        (CloudCategory::Hazy, config.hazy.get(class)),
        (CloudCategory::Distant, config.distant.get(class)),
    ] {
        for _ in 0..count {
            let origin = disc_offset(placer.rng, field);
            let drift = placer.drift(background);
            skipped += u32::from(!placer.place(category, origin, drift));
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} clouds with no loaded image for their set");
    }

    let mut clouds = placer.clouds;
    clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    debug!(count = clouds.len(), clusters, ?class, "Generated cloud field");
    clouds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, CloudManifest};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pixels() -> image::RgbaImage {
        image::RgbaImage::from_pixel(8, 8, image::Rgba([220, 220, 220, 255]))
    }

    fn loaded_pool(fail: &[&str]) -> AssetPool {
        let manifest = CloudManifest::default();
        let mut pool = AssetPool::new(&manifest);
        for entry in &manifest.images {
            let result = if fail.contains(&entry.id.as_str()) {
                Err(AssetError::Io(std::io::Error::other("missing")))
            } else {
                Ok(pixels())
            };
            pool.record(&entry.id, result);
        }
        pool
    }

    fn generate(pool: &AssetPool, class: DeviceClass) -> Vec<Cloud> {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        generate_clouds(
            &CloudConfig::default(),
            Viewport::new(1920, 1080),
            class,
            pool,
            &mut rng,
        )
    }

    #[test]
    fn test_deferred_until_pool_complete() {
        let pool = AssetPool::new(&CloudManifest::default());
        assert!(generate(&pool, DeviceClass::Desktop).is_empty());
    }

    #[test]
    fn test_sorted_far_to_near() {
        let clouds = generate(&loaded_pool(&[]), DeviceClass::Desktop);
        assert!(!clouds.is_empty());
        for pair in clouds.windows(2) {
            assert!(pair[0].depth <= pair[1].depth);
        }
    }

    #[test]
    fn test_category_counts() {
        let config = CloudConfig::default();
        let clouds = generate(&loaded_pool(&[]), DeviceClass::Desktop);
        let count = |c: CloudCategory| clouds.iter().filter(|x| x.category == c).count();
        assert_eq!(count(CloudCategory::Isolated), config.isolated.desktop as usize);
        assert_eq!(count(CloudCategory::Hazy), config.hazy.desktop as usize);
        assert_eq!(count(CloudCategory::Distant), config.distant.desktop as usize);
        assert!(count(CloudCategory::Large) >= 2);
        assert!(count(CloudCategory::Medium) >= 6);
    }

    #[test]
    fn test_ranges_respected() {
        let config = CloudConfig::default();
        for cloud in generate(&loaded_pool(&[]), DeviceClass::Desktop) {
            let ranges = cloud.category.ranges(&config);
            assert!(cloud.depth >= ranges.depth.0 && cloud.depth <= ranges.depth.1);
            assert!(cloud.base_opacity >= ranges.opacity.0 && cloud.base_opacity <= ranges.opacity.1);
            assert!(cloud.rotation.abs() <= config.max_rotation);
        }
    }

    #[test]
    fn test_empty_set_skips_its_categories() {
        let pool = loaded_pool(&["wisp-1", "wisp-2"]);
        let clouds = generate(&pool, DeviceClass::Desktop);
        assert!(!clouds.is_empty());
        assert!(clouds.iter().all(|c| c.category.is_solid()));
    }

    #[test]
    fn test_mobile_is_sparser_and_smaller() {
        let pool = loaded_pool(&[]);
        let desktop = generate(&pool, DeviceClass::Desktop);
        let mobile = generate(&pool, DeviceClass::Mobile);
        assert!(mobile.len() < desktop.len());
        let config = CloudConfig::default();
        let max_mobile_hazy = config.hazy_category.scale.1 * config.mobile_scale;
        assert!(
            mobile
                .iter()
                .filter(|c| c.category == CloudCategory::Hazy)
                .all(|c| c.scale <= max_mobile_hazy + 1e-5)
        );
    }

    #[test]
    fn test_drift_moves_origin_only() {
        let mut cloud = generate(&loaded_pool(&[]), DeviceClass::Desktop).remove(0);
        let before = cloud.origin;
        cloud.drift_by(2.0, f32::INFINITY);
        assert!((cloud.origin - (before + cloud.drift * 2.0)).length() < 1e-4);
    }

    #[test]
    fn test_long_drift_stays_in_field() {
        let config = CloudConfig::default();
        let viewport = Viewport::new(1920, 1080);
        let field = field_radius(&config, viewport);
        let mut clouds = generate(&loaded_pool(&[]), DeviceClass::Desktop);
        // Thirty minutes at 60 frames per second.
        for _ in 0..30 * 60 * 60 {
            for cloud in &mut clouds {
                cloud.drift_by(1.0 / 60.0, field);
            }
        }
        for cloud in &clouds {
            assert!(cloud.origin.length() <= field + 1e-2, "{:?}", cloud.origin);
        }
    }

    #[test]
    fn test_drift_past_edge_reenters_opposite_side() {
        let mut cloud = generate(&loaded_pool(&[]), DeviceClass::Desktop).remove(0);
        cloud.origin = Vec2::new(99.0, 0.0);
        cloud.drift = Vec2::new(5.0, 0.0);
        cloud.drift_by(1.0, 100.0);
        assert!((cloud.origin - Vec2::new(-100.0, 0.0)).length() < 1e-3);
        cloud.drift_by(1.0, 100.0);
        assert!((cloud.origin - Vec2::new(-95.0, 0.0)).length() < 1e-3);
    }
}
