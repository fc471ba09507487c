//! Drawing surface contract.
//!
//! The renderer needs a resizable 2D raster surface with alpha compositing,
//! linear and radial gradients, and a screen blend for cloud images (so an
//! image's dark background drops out). Hosts implement [`Canvas`] over
//! whatever surface they have.

use glam::{Vec2, Vec4};

use crate::assets::SkyImage;

/// How image pixels combine with the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Ordinary alpha compositing.
    SourceOver,
    /// `1 - (1 - src) * (1 - dst)`: dark source pixels leave the surface untouched.
    Screen,
}

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, `[0, 1]`.
    pub offset: f32,
    /// Straight (non-premultiplied) RGBA color.
    pub color: Vec4,
}

impl GradientStop {
    /// Create a stop.
    pub fn new(offset: f32, color: Vec4) -> Self {
        Self { offset, color }
    }
}

/// Placement of an image, centered on `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Screen position of the image center.
    pub center: Vec2,
    /// Uniform scale of the source pixels.
    pub scale: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Mirror horizontally before rotating.
    pub flip_x: bool,
    /// Global opacity.
    pub alpha: f32,
}

/// A 2D raster surface sized to the viewport.
///
/// All colors are straight RGBA in `[0, 1]`. Coordinates are screen pixels
/// with the origin at the top-left corner.
pub trait Canvas {
    /// Current surface size.
    fn size(&self) -> (u32, u32);

    /// Resize the surface. Contents may be discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Fill the whole surface with a top-to-bottom linear gradient.
    fn fill_vertical_gradient(&mut self, top: Vec4, bottom: Vec4);

    /// Fill a disc with a radial gradient from `center` outward.
    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]);

    /// Fill a solid disc.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4);

    /// Fill a rotated ellipse.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Vec4);

    /// Stroke a straight line of constant width and color.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4);

    /// Stroke a line whose width and color are interpolated from `from` to `to`.
    fn stroke_tapered(
        &mut self,
        from: Vec2,
        to: Vec2,
        widths: (f32, f32),
        colors: (Vec4, Vec4),
    );

    /// Composite an image.
    fn draw_image(&mut self, image: &SkyImage, placement: &ImagePlacement, blend: BlendMode);
}

/// Canvas that records draw calls. Used by tests and headless diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    /// Every call in order.
    pub calls: Vec<DrawCall>,
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// [`Canvas::fill_vertical_gradient`].
    Gradient { top: Vec4, bottom: Vec4 },
    /// [`Canvas::fill_radial_gradient`].
    Radial { center: Vec2, radius: f32 },
    /// [`Canvas::fill_circle`].
    Circle { center: Vec2, radius: f32, color: Vec4 },
    /// [`Canvas::fill_ellipse`].
    Ellipse { center: Vec2, color: Vec4 },
    /// [`Canvas::stroke_line`].
    Line { from: Vec2, to: Vec2, color: Vec4 },
    /// [`Canvas::stroke_tapered`].
    Tapered { from: Vec2, to: Vec2, colors: (Vec4, Vec4) },
    /// [`Canvas::draw_image`].
    Image { id: String, placement: ImagePlacement, blend: BlendMode },
}

impl RecordingCanvas {
    /// Create a recording canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded image draws.
    pub fn image_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Image { .. }))
            .count()
    }

    /// Number of recorded constellation-style lines.
    pub fn line_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Line { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn fill_vertical_gradient(&mut self, top: Vec4, bottom: Vec4) {
        self.calls.push(DrawCall::Gradient { top, bottom });
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, _stops: &[GradientStop]) {
        self.calls.push(DrawCall::Radial { center, radius });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, _radii: Vec2, _rotation: f32, color: Vec4) {
        self.calls.push(DrawCall::Ellipse { center, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Vec4) {
        self.calls.push(DrawCall::Line { from, to, color });
    }

    fn stroke_tapered(
        &mut self,
        from: Vec2,
        to: Vec2,
        _widths: (f32, f32),
        colors: (Vec4, Vec4),
    ) {
        self.calls.push(DrawCall::Tapered { from, to, colors });
    }

    fn draw_image(&mut self, image: &SkyImage, placement: &ImagePlacement, blend: BlendMode) {
        self.calls.push(DrawCall::Image {
            id: image.id.clone(),
            placement: *placement,
            blend,
        });
    }
}
