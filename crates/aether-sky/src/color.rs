//! Color helpers. Colors are linear `Vec3`/`Vec4` in `[0, 1]`.

use glam::{Vec3, Vec4};

/// Convert an 8-bit RGB triple to a `Vec3`.
pub fn rgb8(c: [u8; 3]) -> Vec3 {
    Vec3::new(
        f32::from(c[0]) / 255.0,
        f32::from(c[1]) / 255.0,
        f32::from(c[2]) / 255.0,
    )
}

/// Convert a `Vec3` color back to 8-bit RGB, clamping out-of-range channels.
pub fn to_rgb8(c: Vec3) -> [u8; 3] {
    let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
}

/// Attach an alpha channel.
pub fn with_alpha(c: Vec3, alpha: f32) -> Vec4 {
    c.extend(alpha.clamp(0.0, 1.0))
}

/// `#rrggbb` form of an 8-bit color, as published to host chrome.
pub fn hex(c: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb8_roundtrip() {
        let c = [12, 200, 255];
        assert_eq!(to_rgb8(rgb8(c)), c);
    }

    #[test]
    fn test_to_rgb8_clamps() {
        assert_eq!(to_rgb8(Vec3::new(-1.0, 0.5, 2.0)), [0, 128, 255]);
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(hex([11, 16, 38]), "#0b1026");
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(with_alpha(Vec3::ONE, 1.7).w, 1.0);
        assert_eq!(with_alpha(Vec3::ONE, -0.2).w, 0.0);
    }
}
