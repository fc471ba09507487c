//! Viewport geometry.

use glam::Vec2;

/// Size of the drawing surface in pixels. Never zero on either axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport, clamping zero dimensions to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Rotation center.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// The larger of width and height.
    pub fn max_dimension(&self) -> f32 {
        self.width.max(self.height) as f32
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether screen point `p` lies inside the viewport grown by `margin` on every side.
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.is_finite()
            && p.x >= -margin
            && p.y >= -margin
            && p.x <= self.width as f32 + margin
            && p.y <= self.height as f32 + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_clamped() {
        let v = Viewport::new(0, 0);
        assert_eq!(v.size(), (1, 1));
    }

    #[test]
    fn test_center_and_max_dimension() {
        let v = Viewport::new(800, 600);
        assert_eq!(v.center(), Vec2::new(400.0, 300.0));
        assert_eq!(v.max_dimension(), 800.0);
    }

    #[test]
    fn test_contains_with_margin() {
        let v = Viewport::new(800, 600);
        assert!(v.contains(Vec2::new(-50.0, 650.0), 100.0));
        assert!(!v.contains(Vec2::new(-150.0, 300.0), 100.0));
        assert!(!v.contains(Vec2::new(f32::NAN, 300.0), 100.0));
    }
}
