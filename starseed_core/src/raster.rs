// Minimal RGBA8 raster target for planet textures and their overlays.
//
// `TextureData` is the pixel buffer handed to the presentation layer: RGBA8,
// row-major, top-to-bottom, no padding. On top of it this module provides the
// handful of 2D primitives the disc overlay needs (filled circles, circular
// arcs, rotated ellipse outlines), each blended "source-over" with a constant
// alpha.
//
// Coverage is binary per pixel (a pixel's centre is either inside the shape
// or not) and every primitive visits each pixel of its bounding box at most
// once, so overlapping parts of one stroke never double-blend.
//
// See also: `texture.rs` for the per-pixel surface synthesis that fills the
// buffer before the overlays are drawn.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureData {
    /// RGBA8 pixel data, row-major, top-to-bottom.
    pub pixels: Vec<u8>,
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
}

impl TextureData {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "TextureData::new: dimensions must be non-zero");
        Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Wrap existing RGBA8 rows.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "TextureData::from_pixels: buffer length does not match dimensions"
        );
        Self { pixels, width, height }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// RGBA at a pixel. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Overwrite a pixel. Panics when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Blend a color over a pixel with the given opacity (source-over).
    /// Out-of-bounds coordinates are ignored.
    pub fn blend(&mut self, x: i64, y: i64, rgb: Rgb, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        let src_a = alpha.clamp(0.0, 1.0);
        let dst_a = self.pixels[i + 3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        for (c, &src) in rgb.iter().enumerate() {
            let dst = self.pixels[i + c] as f64;
            let value = (src as f64 * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
            self.pixels[i + c] = value.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Circular region pixels must fall inside to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscClip {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl DiscClip {
    fn contains(&self, px: f64, py: f64) -> bool {
        let (dx, dy) = (px - self.cx, py - self.cy);
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Pixel-centre bounding box of a shape, clamped to the buffer.
fn pixel_box(tex: &TextureData, x0: f64, y0: f64, x1: f64, y1: f64) -> (i64, i64, i64, i64) {
    let min_x = (x0.floor() as i64).max(0);
    let min_y = (y0.floor() as i64).max(0);
    let max_x = (x1.ceil() as i64).min(tex.width as i64 - 1);
    let max_y = (y1.ceil() as i64).min(tex.height as i64 - 1);
    (min_x, min_y, max_x, max_y)
}

/// Visit every pixel in the box whose centre satisfies `inside`.
fn paint(
    tex: &mut TextureData,
    bbox: (i64, i64, i64, i64),
    rgb: Rgb,
    alpha: f64,
    inside: impl Fn(f64, f64) -> bool,
) {
    let (min_x, min_y, max_x, max_y) = bbox;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if inside(x as f64 + 0.5, y as f64 + 0.5) {
                tex.blend(x, y, rgb, alpha);
            }
        }
    }
}

/// Fill a circle, optionally clipped to a disc.
pub fn fill_circle(
    tex: &mut TextureData,
    cx: f64,
    cy: f64,
    radius: f64,
    rgb: Rgb,
    alpha: f64,
    clip: Option<DiscClip>,
) {
    let bbox = pixel_box(tex, cx - radius, cy - radius, cx + radius, cy + radius);
    let r_sq = radius * radius;
    paint(tex, bbox, rgb, alpha, |px, py| {
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r_sq && clip.is_none_or(|c| c.contains(px, py))
    });
}

/// Stroke a circular arc from `start` to `end` radians (clockwise in screen
/// space, angle 0 along +x). The stroke is `width` pixels across.
pub fn stroke_arc(
    tex: &mut TextureData,
    (cx, cy): (f64, f64),
    radius: f64,
    (start, end): (f64, f64),
    width: f64,
    rgb: Rgb,
    alpha: f64,
) {
    let half = width / 2.0;
    let outer = radius + half;
    let sweep = (end - start).rem_euclid(std::f64::consts::TAU);
    let bbox = pixel_box(tex, cx - outer, cy - outer, cx + outer, cy + outer);
    paint(tex, bbox, rgb, alpha, |px, py| {
        let (dx, dy) = (px - cx, py - cy);
        if (dx.hypot(dy) - radius).abs() > half {
            return false;
        }
        let angle = dy.atan2(dx);
        (angle - start).rem_euclid(std::f64::consts::TAU) <= sweep
    });
}

/// Stroke a full circle outline.
pub fn stroke_circle(
    tex: &mut TextureData,
    center: (f64, f64),
    radius: f64,
    width: f64,
    rgb: Rgb,
    alpha: f64,
) {
    stroke_ellipse(tex, center, (radius, radius), 0.0, width, rgb, alpha);
}

/// Stroke an ellipse outline with semi-axes `(rx, ry)` rotated by `rotation`
/// radians about its centre.
///
/// Distance to the curve uses the first-order estimate `|f| / |∇f|` for
/// `f = (x/rx)² + (y/ry)² − 1`, accurate near the outline which is all a
/// thin stroke needs.
pub fn stroke_ellipse(
    tex: &mut TextureData,
    (cx, cy): (f64, f64),
    (rx, ry): (f64, f64),
    rotation: f64,
    width: f64,
    rgb: Rgb,
    alpha: f64,
) {
    assert!(rx > 0.0 && ry > 0.0, "stroke_ellipse: semi-axes must be positive");
    let half = width / 2.0;
    let reach = rx.max(ry) + half;
    let (sin, cos) = rotation.sin_cos();
    let bbox = pixel_box(tex, cx - reach, cy - reach, cx + reach, cy + reach);
    paint(tex, bbox, rgb, alpha, |px, py| {
        let (dx, dy) = (px - cx, py - cy);
        // Into the ellipse frame: rotate by -rotation.
        let ex = dx * cos + dy * sin;
        let ey = -dx * sin + dy * cos;
        let f = (ex / rx).powi(2) + (ey / ry).powi(2) - 1.0;
        let gx = 2.0 * ex / (rx * rx);
        let gy = 2.0 * ey / (ry * ry);
        let grad = gx.hypot(gy);
        grad > 0.0 && f.abs() / grad <= half
    });
}
