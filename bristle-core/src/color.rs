//! Paint colors.
//!
//! Channels are kept as `f32` on the 0..255 scale of the pixel buffer so that
//! repeated small blends toward sampled pixels accumulate without rounding.
//! They are only quantized when a color is handed to a [`crate::canvas::Surface`].

const CHANNEL_MAX: f32 = 255.0;

/// Straight (non-premultiplied) RGBA color, every channel in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Hue in degrees `[0, 360)`, saturation and brightness in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsb {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

#[inline]
fn channel(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, CHANNEL_MAX) }
}

impl Rgba {
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Creates a color, clamping every channel into `[0, 255]`.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: channel(a),
        }
    }

    pub fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, CHANNEL_MAX)
    }

    pub fn from_u8([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r as f32, g as f32, b as f32, a as f32)
    }

    /// Rounds to the byte channels used by the pixel buffer.
    pub fn to_u8(self) -> [u8; 4] {
        [
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8,
            self.a.round() as u8,
        ]
    }

    /// Same RGB, alpha replaced. Out-of-range alphas are clamped.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self::new(self.r, self.g, self.b, alpha)
    }

    /// Moves the RGB channels a fraction `t` toward `other`; alpha is kept.
    pub fn lerp_rgb(self, other: Rgba, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a,
        )
    }

    pub fn to_hsb(self) -> Hsb {
        let r = self.r / CHANNEL_MAX;
        let g = self.g / CHANNEL_MAX;
        let b = self.b / CHANNEL_MAX;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;

        if d <= f32::EPSILON {
            return Hsb::new(0.0, 0.0, max * 100.0);
        }

        let sextant = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsb::new(sextant * 60.0, d / max * 100.0, max * 100.0)
    }
}

impl Hsb {
    pub fn new(hue: f32, saturation: f32, brightness: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    /// Converts to RGB with the given alpha on the 0..255 scale.
    pub fn to_rgba(self, alpha: f32) -> Rgba {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let v = (self.brightness / 100.0).clamp(0.0, 1.0);

        if s <= f32::EPSILON {
            let level = v * CHANNEL_MAX;
            return Rgba::new(level, level, level, alpha);
        }

        let h = self.hue.rem_euclid(360.0) / 60.0;
        let sextant = h.floor();
        let f = h - sextant;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sextant as i32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Rgba::new(r * CHANNEL_MAX, g * CHANNEL_MAX, b * CHANNEL_MAX, alpha)
    }
}
