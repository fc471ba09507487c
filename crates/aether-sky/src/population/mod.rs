//! Procedural star and cloud populations.
//!
//! Both populations are laid out in polar coordinates around the viewport
//! center, inside a field whose radius scales with the larger viewport
//! dimension, so rotation never reveals an empty edge. Populations are
//! always regenerated whole, never patched.

mod clouds;
mod stars;

use rand::Rng;

pub use clouds::{Cloud, CloudCategory, field_radius as cloud_field_radius, generate_clouds};
pub use stars::{Star, generate_stars};

/// Uniform sample from an `(min, max)` band. Degenerate bands return `min`.
pub(crate) fn sample<R: Rng + ?Sized>(rng: &mut R, band: (f32, f32)) -> f32 {
    let (lo, hi) = band;
    if hi <= lo {
        return lo;
    }
    lo + (hi - lo) * rng.random::<f32>()
}

/// Uniform integer sample from an inclusive `(min, max)` band.
pub(crate) fn sample_count<R: Rng + ?Sized>(rng: &mut R, band: (u32, u32)) -> u32 {
    let (lo, hi) = band;
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Random point inside a disc of `radius`, uniform by area.
pub(crate) fn disc_offset<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> glam::Vec2 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    glam::Vec2::from_angle(angle) * radius * rng.random::<f32>().sqrt()
}

/// Depth clamped into `(0, 1]`.
pub(crate) fn clamp_depth(depth: f32) -> f32 {
    depth.clamp(f32::EPSILON, 1.0)
}
