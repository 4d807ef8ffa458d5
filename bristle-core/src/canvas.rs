//! Drawing targets.
//!
//! The stroke pipeline talks to its destination through two narrow traits:
//! [`PixelSource`] for the read-only color precompute pass and [`Surface`] for
//! the drawing pass. [`Canvas`] implements both on top of a
//! [`tiny_skia::Pixmap`], scaled by an integer device pixel density.

use std::path::Path;

use glam::Vec2;
use tiny_skia::{ColorU8, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::{color::Rgba, error::CanvasError};

/// Pixel containing `p`, with halves rounded up (`-0.5` maps to `0`).
pub fn nearest_pixel(p: Vec2) -> (i32, i32) {
    let p = (p + 0.5).floor();
    (p.x as i32, p.y as i32)
}

/// Read access to already painted pixels, in logical coordinates.
pub trait PixelSource {
    /// Straight-alpha color at logical pixel `(x, y)`, or `None` outside
    /// the buffer.
    fn sample(&self, x: i32, y: i32) -> Option<Rgba>;
}

/// Write access used while painting bristles.
pub trait Surface {
    fn set_stroke(&mut self, color: Rgba);
    fn set_stroke_weight(&mut self, weight: f32);
    /// Draws a segment with the current stroke color and weight.
    fn line(&mut self, from: Vec2, to: Vec2);
}

/// RGBA pixel buffer with square-capped, anti-aliased line drawing.
pub struct Canvas {
    pixmap: Pixmap,
    width: u32,
    height: u32,
    density: u32,
    stroke: Rgba,
    stroke_weight: f32,
}

impl Canvas {
    /// Creates a transparent canvas at density 1.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::with_density(width, height, 1)
    }

    /// Creates a transparent canvas whose backing pixmap holds
    /// `density × density` device pixels per logical pixel.
    pub fn with_density(width: u32, height: u32, density: u32) -> Result<Self, CanvasError> {
        let invalid = CanvasError::InvalidSize {
            width,
            height,
            density,
        };
        let (Some(pw), Some(ph)) = (width.checked_mul(density), height.checked_mul(density)) else {
            return Err(invalid);
        };
        let pixmap = Pixmap::new(pw, ph).ok_or(invalid)?;

        Ok(Self {
            pixmap,
            width,
            height,
            density,
            stroke: Rgba::opaque(0.0, 0.0, 0.0),
            stroke_weight: 1.0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn density(&self) -> u32 {
        self.density
    }

    /// Makes every pixel fully transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Overwrites the logical pixel `(x, y)` without blending.
    ///
    /// Returns `false` when the pixel lies outside the canvas.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) -> bool {
        if !self.contains(x, y) {
            return false;
        }

        let [r, g, b, a] = color.to_u8();
        let premultiplied = ColorU8::from_rgba(r, g, b, a).premultiply();
        let stride = self.pixmap.width() as usize;
        let d = self.density as usize;
        let (x0, y0) = (x as usize * d, y as usize * d);
        let pixels = self.pixmap.pixels_mut();

        for py in y0..y0 + d {
            for px in x0..x0 + d {
                pixels[py * stride + px] = premultiplied;
            }
        }
        true
    }

    /// Backing pixmap (premultiplied, device resolution).
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Raw premultiplied bytes of the backing pixmap.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight-alpha RGBA bytes at device resolution, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), CanvasError> {
        let path = path.as_ref();
        self.pixmap.save_png(path).map_err(|e| CanvasError::Png {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }
}

impl PixelSource for Canvas {
    fn sample(&self, x: i32, y: i32) -> Option<Rgba> {
        if !self.contains(x, y) {
            return None;
        }
        let d = self.density;
        let c = self.pixmap.pixel(x as u32 * d, y as u32 * d)?.demultiply();
        Some(Rgba::from_u8([c.red(), c.green(), c.blue(), c.alpha()]))
    }
}

impl Surface for Canvas {
    fn set_stroke(&mut self, color: Rgba) {
        self.stroke = color;
    }

    fn set_stroke_weight(&mut self, weight: f32) {
        self.stroke_weight = weight;
    }

    fn line(&mut self, from: Vec2, to: Vec2) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        let [r, g, b, a] = self.stroke.to_u8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: self.stroke_weight,
            line_cap: LineCap::Square,
            ..Stroke::default()
        };

        let scale = self.density as f32;
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            Transform::from_scale(scale, scale),
            None,
        );
    }
}
