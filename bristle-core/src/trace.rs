//! One brush stroke along a fixed path.
//!
//! A stroke is produced in two passes over the same path:
//! 1. [`Trace::precompute_colors`] walks the brush without moving the
//!    bristles, carries each bristle's color from step to step and lets it
//!    pick up a little of whatever paint already lies under its anchor.
//! 2. [`Trace::paint`] replays the walk, this time dragging the bristles, and
//!    draws them with the precomputed colors.
//!
//! The passes are encoded as the type states [`Uncolored`] and [`Colored`]:
//! `paint` only exists on a `Trace<Colored>`, which can only be obtained from
//! `precompute_colors`.
//!
//! Both passes should run back to back against the same canvas. If another
//! stroke paints onto the canvas in between, this stroke's mixing reflects a
//! canvas it never paints onto.

use glam::Vec2;
use tracing::{debug, trace};

use crate::{
    brush::Brush,
    canvas::{PixelSource, Surface, nearest_pixel},
    color::{Hsb, Rgba},
    config::{Config, TraceConfig},
    context::SimContext,
    error::StrokeError,
    noise::{Noise1D, ValueNoise1D},
    types::StepId,
};

/// Spacing of bristles in the color-variance noise domain.
const COLOR_NOISE_STEP: f32 = 0.4;

const MAX_ALPHA: i32 = 255;

/// State of a trace whose bristle colors have not been computed yet.
#[derive(Debug, Clone, Copy)]
pub struct Uncolored;

/// State of a trace holding one color per step and bristle.
#[derive(Debug, Clone)]
pub struct Colored {
    bristle_colors: Vec<Vec<Rgba>>,
}

#[derive(Debug, Clone)]
pub struct Trace<'a, S = Uncolored> {
    cfg: TraceConfig,
    path: &'a [Vec2],
    brush: Brush,
    alphas: Vec<i32>,
    noise: ValueNoise1D,
    color_noise_seed: f32,
    state: S,
}

impl<'a> Trace<'a, Uncolored> {
    /// Creates a trace with the default [`Config`].
    pub fn new(path: &'a [Vec2], brush_size: f32, ctx: &mut SimContext) -> Result<Self, StrokeError> {
        Self::with_config(path, brush_size, &Config::default(), ctx)
    }

    /// Creates a trace over `path` with a brush of `brush_size` placed at its
    /// first point.
    ///
    /// Draws the brush's samples from `ctx`, followed by the seed for the
    /// per-bristle color variance.
    pub fn with_config(
        path: &'a [Vec2],
        brush_size: f32,
        cfg: &Config,
        ctx: &mut SimContext,
    ) -> Result<Self, StrokeError> {
        let &start = path.first().ok_or(StrokeError::EmptyPath)?;
        let brush = Brush::with_config(start, brush_size, cfg.brush, ctx);
        let color_noise_seed = ctx.uniform(0.0, 1000.0);
        let alphas = alpha_schedule(path.len(), cfg.trace.max_alpha_decrement);

        debug!(
            n_steps = path.len(),
            n_bristles = brush.n_bristles(),
            brush_size,
            "created trace"
        );

        Ok(Self {
            cfg: cfg.trace,
            path,
            brush,
            alphas,
            noise: ctx.noise_field().clone(),
            color_noise_seed,
            state: Uncolored,
        })
    }

    /// Computes every bristle's color at every step, reading (never writing)
    /// the destination canvas for wet mixing.
    ///
    /// Bristle colors start from `base` with a small per-bristle brightness
    /// variance. From step `mix_starting_step` on, a bristle whose anchor
    /// lies over a painted pixel moves `mix_strength` of the way toward that
    /// pixel's color. Opacity follows [`Trace::alphas`].
    pub fn precompute_colors(mut self, base: Rgba, pixels: &impl PixelSource) -> Trace<'a, Colored> {
        let n_steps = self.path.len();
        let hsb = base.to_hsb();
        let first_alpha = self.alphas[0] as f32;

        let initial: Vec<Rgba> = (0..self.brush.n_bristles())
            .map(|i| {
                let variance = self
                    .noise
                    .sample(self.color_noise_seed + COLOR_NOISE_STEP * i as f32)
                    - 0.5;
                let delta = self.cfg.brightness_relative_change * hsb.brightness * variance;
                let brightness = (hsb.brightness + delta).clamp(0.0, 100.0);
                Hsb::new(hsb.hue, hsb.saturation, brightness).to_rgba(first_alpha)
            })
            .collect();

        self.brush.move_to(self.path[0]);

        let mut bristle_colors = Vec::with_capacity(n_steps);
        bristle_colors.push(initial);
        let mut mix_hits = 0usize;

        for step in 1..n_steps {
            self.brush.update(self.path[step], false);

            let alpha = self.alphas[step] as f32;
            let mut colors: Vec<Rgba> = bristle_colors[step - 1]
                .iter()
                .map(|c| c.with_alpha(alpha))
                .collect();

            if step >= self.cfg.mix_starting_step
                && let Some(anchors) = self.brush.anchor_positions()
            {
                for (color, anchor) in colors.iter_mut().zip(anchors) {
                    if !anchor.is_finite() {
                        continue;
                    }
                    let (x, y) = nearest_pixel(*anchor);
                    if let Some(painted) = pixels.sample(x, y)
                        && painted.a > 0.0
                    {
                        *color = color.lerp_rgb(painted, self.cfg.mix_strength);
                        mix_hits += 1;
                        trace!(step, x, y, "mixed with painted pixel");
                    }
                }
            }

            bristle_colors.push(colors);
        }

        debug!(n_steps, mix_hits, "precomputed bristle colors");

        Trace {
            cfg: self.cfg,
            path: self.path,
            brush: self.brush,
            alphas: self.alphas,
            noise: self.noise,
            color_noise_seed: self.color_noise_seed,
            state: Colored { bristle_colors },
        }
    }
}

impl Trace<'_, Colored> {
    /// Replays the path, dragging the bristles and drawing them with the
    /// precomputed colors.
    ///
    /// Can be called more than once; every call restarts from the first
    /// path point.
    pub fn paint(&mut self, surface: &mut impl Surface) {
        self.brush.move_to(self.path[0]);

        for step in 1..self.path.len() {
            self.brush.update(self.path[step], true);
            self.brush.paint(&self.state.bristle_colors[step], surface);
        }

        trace!(n_steps = self.path.len(), "painted trace");
    }

    /// Colors indexed by `[step][bristle]`. Row 0 holds the initial colors.
    pub fn bristle_colors(&self) -> &[Vec<Rgba>] {
        &self.state.bristle_colors
    }

    pub fn step_colors(&self, step: StepId) -> &[Rgba] {
        &self.state.bristle_colors[step]
    }
}

impl<S> Trace<'_, S> {
    pub fn n_steps(&self) -> usize {
        self.path.len()
    }

    pub fn n_bristles(&self) -> usize {
        self.brush.n_bristles()
    }

    pub fn path(&self) -> &[Vec2] {
        self.path
    }

    /// Opacity per step on the 0..255 scale, never increasing.
    pub fn alphas(&self) -> &[i32] {
        &self.alphas
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }
}

/// `255 - d·i` with `d = min(floor(255 / n_steps), max_decrement)`.
fn alpha_schedule(n_steps: usize, max_decrement: i32) -> Vec<i32> {
    let per_step = i32::try_from(n_steps).map_or(0, |n| MAX_ALPHA / n);
    let decrement = per_step.min(max_decrement);
    (0..n_steps)
        .map(|i| {
            let i = i32::try_from(i).unwrap_or(i32::MAX);
            MAX_ALPHA.saturating_sub(decrement.saturating_mul(i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bristle::tests::RecordingSurface, canvas::Canvas};

    fn line_path(start: Vec2, n: usize, step: Vec2) -> Vec<Vec2> {
        (0..n).map(|i| start + step * i as f32).collect()
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut ctx = SimContext::seeded(1);
        let err = Trace::new(&[], 20.0, &mut ctx).unwrap_err();
        assert_eq!(err, StrokeError::EmptyPath);
    }

    #[test]
    fn alpha_schedule_decreases_by_capped_step() {
        assert_eq!(alpha_schedule(2, 25), vec![255, 230]);
        assert_eq!(alpha_schedule(1, 25), vec![255]);

        let a = alpha_schedule(80, 25);
        assert_eq!(a[0], 255);
        assert_eq!(a[1], 252);
        assert_eq!(a[79], 255 - 3 * 79);

        // Long paths stop fading once 255 / n_steps rounds to zero.
        assert!(alpha_schedule(300, 25).iter().all(|&v| v == 255));

        for n in [3, 10, 17, 80, 254, 256] {
            let a = alpha_schedule(n, 25);
            assert!(a.windows(2).all(|w| w[1] <= w[0]), "n = {}", n);
        }
    }

    #[test]
    fn construction_copies_brush_shape() {
        let mut ctx = SimContext::seeded(4);
        let path = line_path(Vec2::new(50.0, 50.0), 30, Vec2::new(2.0, 0.0));
        let t = Trace::new(&path, 20.0, &mut ctx).unwrap();

        assert_eq!(t.n_steps(), 30);
        assert_eq!(t.n_bristles(), t.brush().n_bristles());
        assert_eq!(t.alphas().len(), 30);
        assert_eq!(t.brush().position(), path[0]);
    }

    #[test]
    fn blank_canvas_only_fades_colors() {
        let mut ctx = SimContext::seeded(21);
        let canvas = Canvas::new(200, 200).unwrap();
        let path = line_path(Vec2::new(40.0, 100.0), 40, Vec2::new(2.0, 0.5));
        let base = Rgba::opaque(180.0, 40.0, 90.0);
        let base_brightness = base.to_hsb().brightness;

        let t = Trace::new(&path, 30.0, &mut ctx)
            .unwrap()
            .precompute_colors(base, &canvas);
        let colors = t.bristle_colors();

        assert_eq!(colors.len(), 40);
        for (step, row) in colors.iter().enumerate() {
            assert_eq!(row.len(), t.n_bristles());
            for (j, c) in row.iter().enumerate() {
                assert_eq!(c.a, t.alphas()[step] as f32);
                assert_eq!((c.r, c.g, c.b), (colors[0][j].r, colors[0][j].g, colors[0][j].b));
            }
        }

        for c in &colors[0] {
            let hsb = c.to_hsb();
            assert!((hsb.brightness - base_brightness).abs() <= 0.05 * base_brightness + 1e-3);
        }
    }

    #[test]
    fn painted_canvas_pulls_colors_after_mix_start() {
        let mut ctx = SimContext::seeded(8);
        let mut canvas = Canvas::new(300, 300).unwrap();
        let wet = Rgba::opaque(0.0, 255.0, 0.0);
        for y in 0..300 {
            for x in 0..300 {
                canvas.set_pixel(x, y, wet);
            }
        }

        let path = line_path(Vec2::new(100.0, 150.0), 20, Vec2::new(2.0, 0.0));
        let t = Trace::new(&path, 20.0, &mut ctx)
            .unwrap()
            .precompute_colors(Rgba::opaque(200.0, 0.0, 200.0), &canvas);
        let colors = t.bristle_colors();

        // No mixing before the starting step.
        for j in 0..t.n_bristles() {
            assert_eq!(colors[9][j].g, colors[0][j].g);
        }

        for step in 10..20 {
            for j in 0..t.n_bristles() {
                let expected = colors[step - 1][j]
                    .with_alpha(t.alphas()[step] as f32)
                    .lerp_rgb(wet, 0.02);
                assert_eq!(colors[step][j], expected);
            }
        }
        assert!(colors[19][0].g > colors[9][0].g);
    }

    #[test]
    fn mixing_reads_logical_pixels_on_dense_canvas() {
        let wet = Rgba::opaque(0.0, 255.0, 0.0);
        let left_half_painted = |density| {
            let mut canvas = Canvas::with_density(150, 150, density).unwrap();
            for y in 0..150 {
                for x in 0..60 {
                    canvas.set_pixel(x, y, wet);
                }
            }
            canvas
        };
        let path = line_path(Vec2::new(20.0, 75.0), 30, Vec2::new(2.0, 0.0));
        let run = |canvas: &Canvas| {
            let mut ctx = SimContext::seeded(12);
            Trace::new(&path, 20.0, &mut ctx)
                .unwrap()
                .precompute_colors(Rgba::opaque(200.0, 0.0, 200.0), canvas)
                .bristle_colors()
                .to_vec()
        };

        let dense = run(&left_half_painted(2));
        assert_eq!(dense, run(&left_half_painted(1)));

        // The brush starts over the painted half and leaves it around step 20.
        for (before, after) in dense[9].iter().zip(&dense[10]) {
            assert!(after.g > before.g);
        }
        assert!(dense[9].iter().zip(&dense[0]).all(|(a, b)| a.g == b.g));
    }

    #[test]
    fn anchors_off_canvas_skip_mixing() {
        let mut ctx = SimContext::seeded(13);
        let mut canvas = Canvas::new(20, 20).unwrap();
        for y in 0..20 {
            for x in 0..20 {
                canvas.set_pixel(x, y, Rgba::opaque(0.0, 0.0, 255.0));
            }
        }

        // Far outside the canvas on the negative side.
        let path = line_path(Vec2::new(-500.0, -500.0), 25, Vec2::new(-2.0, 1.0));
        let t = Trace::new(&path, 25.0, &mut ctx)
            .unwrap()
            .precompute_colors(Rgba::opaque(255.0, 0.0, 0.0), &canvas);

        let first = &t.bristle_colors()[0];
        let last = &t.bristle_colors()[24];
        for (a, b) in first.iter().zip(last) {
            assert_eq!((a.r, a.g, a.b), (b.r, b.g, b.b));
        }
    }

    #[test]
    fn same_seed_gives_identical_color_matrix() {
        let canvas = Canvas::new(160, 160).unwrap();
        let path = line_path(Vec2::new(30.0, 30.0), 50, Vec2::new(1.5, 1.5));

        let run = |seed| {
            let mut ctx = SimContext::seeded(seed);
            Trace::new(&path, 40.0, &mut ctx)
                .unwrap()
                .precompute_colors(Rgba::opaque(30.0, 60.0, 200.0), &canvas)
                .bristle_colors()
                .to_vec()
        };

        assert_eq!(run(77), run(77));
        assert_ne!(run(77), run(78));
    }

    #[test]
    fn paint_draws_every_warmed_up_step() {
        let mut ctx = SimContext::seeded(5);
        let canvas = Canvas::new(100, 100).unwrap();
        let path = line_path(Vec2::new(10.0, 10.0), 20, Vec2::new(2.0, 2.0));
        let mut t = Trace::new(&path, 10.0, &mut ctx)
            .unwrap()
            .precompute_colors(Rgba::opaque(10.0, 10.0, 10.0), &canvas);

        let mut surface = RecordingSurface::default();
        t.paint(&mut surface);

        // Steps 1..=3 are warm-up; steps 4..20 paint every link of every bristle.
        let links = t.brush().bristle(0).n_links();
        assert_eq!(surface.lines.len(), 16 * t.n_bristles() * links);

        // Colors of the last step are used last, in bristle order.
        let last = t.step_colors(19);
        let tail = &surface.lines[surface.lines.len() - links * t.n_bristles()..];
        for (j, chunk) in tail.chunks(links).enumerate() {
            assert!(chunk.iter().all(|l| l.3 == last[j]));
        }
    }

    #[test]
    fn repainting_replays_identically() {
        let mut ctx = SimContext::seeded(31);
        let blank = Canvas::new(120, 120).unwrap();
        let path = line_path(Vec2::new(20.0, 60.0), 30, Vec2::new(2.0, 0.3));
        let mut t = Trace::new(&path, 25.0, &mut ctx)
            .unwrap()
            .precompute_colors(Rgba::opaque(90.0, 20.0, 160.0), &blank);

        let mut a = RecordingSurface::default();
        let mut b = RecordingSurface::default();
        t.paint(&mut a);
        t.paint(&mut b);
        assert_eq!(a.lines, b.lines);
    }
}
