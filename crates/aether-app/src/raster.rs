//! Software [`Canvas`] over an RGBA image buffer.
//!
//! Every primitive works the same way: compute a pixel bounding box, then
//! evaluate coverage at each pixel center and composite. Edges get a one
//! pixel linear falloff, which is enough antialiasing for still frames.

use std::path::Path;

use aether_sky::{BlendMode, Canvas, GradientStop, ImagePlacement, SkyImage};
use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use image::{Rgba, RgbaImage};

/// CPU raster surface.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
}

/// Inclusive-exclusive pixel rectangle `(x0, y0, x1, y1)`.
type PixelRect = (u32, u32, u32, u32);

fn to_vec4(pixel: &Rgba<u8>) -> Vec4 {
    Vec4::new(
        pixel[0] as f32,
        pixel[1] as f32,
        pixel[2] as f32,
        pixel[3] as f32,
    ) / 255.0
}

fn to_rgba(color: Vec4) -> Rgba<u8> {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8])
}

/// Parameter of the closest point on segment `a..b` and the distance to it.
fn project(p: Vec2, a: Vec2, b: Vec2) -> (f32, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (t, p.distance(a + ab * t))
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Vec4 {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Vec4::ZERO;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.offset {
            let span = hi.offset - lo.offset;
            let local = if span > 0.0 { (t - lo.offset) / span } else { 1.0 };
            return lo.color.lerp(hi.color, local);
        }
    }
    last.color
}

impl RasterCanvas {
    /// Transparent black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Rendered pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the surface to disk; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save(path)
    }

    fn bounds(&self, min: Vec2, max: Vec2) -> Option<PixelRect> {
        let (w, h) = self.image.dimensions();
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(w);
        let y1 = (max.y.ceil().max(0.0) as u32).min(h);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Source-over `color` at `coverage` onto pixel `(x, y)`.
    fn blend(&mut self, x: u32, y: u32, color: Vec4, coverage: f32) {
        let a = (color.w * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x, y);
        let dst = to_vec4(pixel);
        let rgb = color.xyz() * a + dst.xyz() * (1.0 - a);
        let alpha = a + dst.w * (1.0 - a);
        *pixel = to_rgba(rgb.extend(alpha));
    }

    fn screen(&mut self, x: u32, y: u32, src: Vec3) {
        let pixel = self.image.get_pixel_mut(x, y);
        let dst = to_vec4(pixel);
        let rgb = Vec3::ONE - (Vec3::ONE - src) * (Vec3::ONE - dst.xyz());
        *pixel = to_rgba(rgb.extend(dst.w.max(src.max_element())));
    }

    /// Visit every pixel center inside the box around `center` with `extent`.
    fn for_each_pixel(
        &mut self,
        center: Vec2,
        extent: Vec2,
        mut shade: impl FnMut(Vec2) -> Option<(Vec4, f32)>,
    ) {
        let Some((x0, y0, x1, y1)) = self.bounds(center - extent, center + extent) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some((color, coverage)) = shade(p) {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn fill_vertical_gradient(&mut self, top: Vec4, bottom: Vec4) {
        let (w, h) = self.image.dimensions();
        for y in 0..h {
            let t = (y as f32 + 0.5) / h as f32;
            let color = top.lerp(bottom, t);
            for x in 0..w {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        if radius <= 0.0 || stops.is_empty() {
            return;
        }
        self.for_each_pixel(center, Vec2::splat(radius), |p| {
            let d = p.distance(center) / radius;
            (d <= 1.0).then(|| (sample_stops(stops, d), 1.0))
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        if radius <= 0.0 {
            return;
        }
        // Sub-pixel discs fade out instead of vanishing.
        let area = (radius * 2.0).min(1.0);
        self.for_each_pixel(center, Vec2::splat(radius + 1.0), |p| {
            let coverage = (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0) * area;
            (coverage > 0.0).then_some((color, coverage))
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Vec4) {
        if radii.min_element() <= 0.0 {
            return;
        }
        let unrotate = Vec2::from_angle(-rotation);
        let edge = radii.min_element();
        self.for_each_pixel(center, Vec2::splat(radii.max_element() + 1.0), |p| {
            let local = unrotate.rotate(p - center) / radii;
            let coverage = ((1.0 - local.length()) * edge + 0.5).clamp(0.0, 1.0);
            (coverage > 0.0).then_some((color, coverage))
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4) {
        self.stroke_tapered(from, to, (width, width), (color, color));
    }

    fn stroke_tapered(
        &mut self,
        from: Vec2,
        to: Vec2,
        widths: (f32, f32),
        colors: (Vec4, Vec4),
    ) {
        let half_max = widths.0.max(widths.1) * 0.5 + 1.0;
        let center = (from + to) * 0.5;
        let extent = (to - from).abs() * 0.5 + Vec2::splat(half_max);
        self.for_each_pixel(center, extent, |p| {
            let (t, d) = project(p, from, to);
            let half = (widths.0 + (widths.1 - widths.0) * t) * 0.5;
            let thin = (half * 2.0).min(1.0);
            let coverage = (half + 0.5 - d).clamp(0.0, 1.0) * thin;
            (coverage > 0.0).then(|| (colors.0.lerp(colors.1, t), coverage))
        });
    }

    fn draw_image(&mut self, image: &SkyImage, placement: &ImagePlacement, blend: BlendMode) {
        if placement.scale <= 0.0 || placement.alpha <= 0.0 {
            return;
        }
        let (iw, ih) = image.dimensions();
        let size = Vec2::new(iw as f32, ih as f32);
        let extent = Vec2::splat((size * placement.scale * 0.5).length());
        let Some((x0, y0, x1, y1)) = self.bounds(placement.center - extent, placement.center + extent)
        else {
            return;
        };
        let unrotate = Vec2::from_angle(-placement.rotation);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let mut local = unrotate.rotate(p - placement.center) / placement.scale;
                if placement.flip_x {
                    local.x = -local.x;
                }
                let src = local + size * 0.5;
                if src.x < 0.0 || src.y < 0.0 || src.x >= size.x || src.y >= size.y {
                    continue;
                }
                let texel = to_vec4(image.pixels.get_pixel(src.x as u32, src.y as u32));
                let a = texel.w * placement.alpha;
                match blend {
                    BlendMode::SourceOver => self.blend(x, y, texel, placement.alpha),
                    BlendMode::Screen => self.screen(x, y, texel.xyz() * a),
                }
            }
        }
    }
}
