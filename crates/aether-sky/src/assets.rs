//! Cloud image assets: the RON manifest, per-image load results, and the
//! completion tally that gates cloud generation.
//!
//! Images arrive one by one (asynchronously on the host). Every result,
//! success or failure, counts toward the tally; a failed image is simply
//! missing from the pool its set draws from.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::weighted;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while reading the manifest or decoding an image.
#[derive(Debug, Error)]
pub enum AssetError {
    /// I/O error reading a file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error.
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Image decode error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Which family of cloud art an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudSet {
    /// Dense, well-defined clouds used for clusters and isolated clouds.
    Cumulus,
    /// Thin, soft clouds used for hazy and distant fill.
    Wisp,
}

/// A single image entry in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudImageEntry {
    /// Identifier reported back with the load result.
    pub id: String,
    /// File path relative to the asset root.
    pub path: String,
    /// Art family.
    pub set: CloudSet,
    /// Selection weight within the set.
    pub weight: f32,
}

/// Fixed list of cloud images to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudManifest {
    /// Image entries.
    pub images: Vec<CloudImageEntry>,
}

fn entry(id: &str, set: CloudSet, weight: f32) -> CloudImageEntry {
    CloudImageEntry {
        id: id.to_string(),
        path: format!("{id}.png"),
        set,
        weight,
    }
}

impl Default for CloudManifest {
    fn default() -> Self {
        Self {
            images: vec![
                entry("cumulus-1", CloudSet::Cumulus, 0.3),
                entry("cumulus-2", CloudSet::Cumulus, 0.3),
                entry("cumulus-3", CloudSet::Cumulus, 0.25),
                entry("cumulus-4", CloudSet::Cumulus, 0.15),
                entry("wisp-1", CloudSet::Wisp, 0.6),
                entry("wisp-2", CloudSet::Wisp, 0.4),
            ],
        }
    }
}

impl CloudManifest {
    /// Parse a manifest from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, AssetError> {
        Ok(ron::from_str(contents)?)
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let contents = std::fs::read_to_string(path)?;
        let manifest = Self::from_ron_str(&contents)?;
        info!(
            "Loaded cloud manifest with {} images from {}",
            manifest.images.len(),
            path.display()
        );
        Ok(manifest)
    }
}

/// Decode an image file into RGBA pixels.
pub fn load_image(path: &Path) -> Result<image::RgbaImage, AssetError> {
    Ok(image::open(path)?.to_rgba8())
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// A decoded cloud image.
#[derive(Debug, Clone)]
pub struct SkyImage {
    /// Manifest identifier.
    pub id: String,
    /// RGBA pixels. Dark backgrounds are expected; clouds composite with a screen blend.
    pub pixels: image::RgbaImage,
}

impl SkyImage {
    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Index of an image inside an [`AssetPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

#[derive(Debug)]
enum Slot {
    Pending,
    Loaded(SkyImage),
    Failed,
}

#[derive(Debug)]
struct PoolEntry {
    id: String,
    set: CloudSet,
    weight: f32,
    slot: Slot,
}

/// Loaded cloud images plus the load tally.
#[derive(Debug)]
pub struct AssetPool {
    entries: Vec<PoolEntry>,
    settled: usize,
}

impl AssetPool {
    /// Create a pool expecting every image in `manifest`.
    pub fn new(manifest: &CloudManifest) -> Self {
        let entries = manifest
            .images
            .iter()
            .map(|e| PoolEntry {
                id: e.id.clone(),
                set: e.set,
                weight: e.weight.max(0.0),
                slot: Slot::Pending,
            })
            .collect();
        Self {
            entries,
            settled: 0,
        }
    }

    /// Record the load result for image `id`.
    ///
    /// Returns `true` when this result completes the tally. Unknown ids and
    /// repeated results are ignored.
    pub fn record(&mut self, id: &str, result: Result<image::RgbaImage, AssetError>) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            warn!("Ignoring load result for unknown cloud image '{id}'");
            return false;
        };
        if !matches!(entry.slot, Slot::Pending) {
            debug!("Duplicate load result for cloud image '{id}'");
            return false;
        }
        entry.slot = match result {
            Ok(pixels) => Slot::Loaded(SkyImage {
                id: id.to_string(),
                pixels,
            }),
            Err(e) => {
                warn!("Cloud image '{id}' failed to load: {e}");
                Slot::Failed
            }
        };
        self.settled += 1;
        let complete = self.is_complete();
        if complete {
            info!(
                "Cloud assets settled: {} loaded, {} failed",
                self.loaded_count(),
                self.failed_count()
            );
        }
        complete
    }

    /// Whether every manifest entry has reported a result.
    pub fn is_complete(&self) -> bool {
        self.settled == self.entries.len()
    }

    /// Number of results received so far.
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    /// Number of images available for drawing.
    pub fn loaded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.slot, Slot::Loaded(_)))
            .count()
    }

    /// Number of images that failed.
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.slot, Slot::Failed))
            .count()
    }

    /// Look up a loaded image.
    pub fn get(&self, id: ImageId) -> Option<&SkyImage> {
        match &self.entries.get(id.0)?.slot {
            Slot::Loaded(image) => Some(image),
            Slot::Pending | Slot::Failed => None,
        }
    }

    /// Weighted pick among the loaded images of `set`. `None` when the set is empty.
    pub fn pick<R: Rng + ?Sized>(&self, set: CloudSet, rng: &mut R) -> Option<ImageId> {
        let available: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.set == set && matches!(e.slot, Slot::Loaded(_)))
            .map(|(i, e)| (i, e.weight))
            .collect();
        let total: f32 = available.iter().map(|(_, w)| w).sum();
        if available.is_empty() {
            return None;
        }
        let draw = rng.random::<f32>() * total;
        weighted::pick_with(&available, draw).map(|&i| ImageId(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pixels() -> image::RgbaImage {
        image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 200, 200, 255]))
    }

    fn failure() -> AssetError {
        AssetError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
    }

    #[test]
    fn test_tally_counts_failures() {
        let manifest = CloudManifest::default();
        let mut pool = AssetPool::new(&manifest);
        let ids: Vec<String> = manifest.images.iter().map(|e| e.id.clone()).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(!pool.is_complete());
            let result = if i == 0 { Err(failure()) } else { Ok(pixels()) };
            let done = pool.record(id, result);
            assert_eq!(done, i + 1 == ids.len());
        }
        assert!(pool.is_complete());
        assert_eq!(pool.failed_count(), 1);
        assert_eq!(pool.loaded_count(), ids.len() - 1);
    }

    #[test]
    fn test_unknown_and_duplicate_results_ignored() {
        let mut pool = AssetPool::new(&CloudManifest::default());
        assert!(!pool.record("nope", Ok(pixels())));
        assert_eq!(pool.settled_count(), 0);
        pool.record("wisp-1", Ok(pixels()));
        pool.record("wisp-1", Err(failure()));
        assert_eq!(pool.settled_count(), 1);
        assert_eq!(pool.loaded_count(), 1);
    }

    #[test]
    fn test_pick_skips_failed_images() {
        let mut pool = AssetPool::new(&CloudManifest::default());
        pool.record("wisp-1", Err(failure()));
        pool.record("wisp-2", Ok(pixels()));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let id = pool.pick(CloudSet::Wisp, &mut rng).unwrap();
            assert_eq!(pool.get(id).unwrap().id, "wisp-2");
        }
    }

    #[test]
    fn test_pick_from_empty_set_is_none() {
        let mut pool = AssetPool::new(&CloudManifest::default());
        pool.record("wisp-1", Ok(pixels()));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(pool.pick(CloudSet::Cumulus, &mut rng), None);
    }

    #[test]
    fn test_manifest_parses_from_ron() {
        let ron_str = r#"(images: [(id: "c", path: "c.png", set: Cumulus, weight: 1.0)])"#;
        let manifest = CloudManifest::from_ron_str(ron_str).unwrap();
        assert_eq!(manifest.images.len(), 1);
        assert_eq!(manifest.images[0].set, CloudSet::Cumulus);
    }

    #[test]
    fn test_missing_image_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_image(&dir.path().join("absent.png"));
        assert!(result.is_err());
    }
}
