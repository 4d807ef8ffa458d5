//! Random strokes on a canvas.
//!
//! [`paint_random_trace`] is the unit of work a host calls once per tick: it
//! builds a wandering path somewhere on the canvas and runs the full
//! precompute-then-paint cycle of one [`Trace`] before returning, so strokes
//! painted one after another never interleave.

use glam::Vec2;
use tracing::debug;

use crate::{
    canvas::Canvas,
    color::Rgba,
    config::Config,
    context::SimContext,
    error::StrokeError,
    path::RandomWalk,
    trace::Trace,
};

/// What a call to [`paint_random_trace`] produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintedStroke {
    pub start: Vec2,
    pub base_color: Rgba,
    pub n_bristles: usize,
}

/// Paints one random stroke onto `canvas`.
///
/// The walk starts uniformly inside the canvas minus a `margin` band on each
/// side; the base color is a random red over a fixed blue
/// (`(uniform(0, 255), 0, 200)`).
pub fn paint_random_trace(
    ctx: &mut SimContext,
    canvas: &mut Canvas,
    cfg: &Config,
) -> Result<PaintedStroke, StrokeError> {
    let s = &cfg.sketch;
    let walk = RandomWalk::sample(ctx, s.speed, s.heading_noise_scale);

    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let start = Vec2::new(
        ctx.uniform(s.margin * w, (1.0 - s.margin) * w),
        ctx.uniform(s.margin * h, (1.0 - s.margin) * h),
    );
    let path = walk.points(ctx.noise_field(), start, s.n_steps);

    let trace = Trace::with_config(&path, s.brush_size, cfg, ctx)?;
    let base_color = Rgba::opaque(ctx.uniform(0.0, 255.0), 0.0, 200.0);
    let n_bristles = trace.n_bristles();

    let mut trace = trace.precompute_colors(base_color, &*canvas);
    trace.paint(canvas);

    debug!(?start, n_bristles, "painted random trace");

    Ok(PaintedStroke {
        start,
        base_color,
        n_bristles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_starts_inside_margin_and_leaves_paint() {
        let mut ctx = SimContext::seeded(2024);
        let mut canvas = Canvas::new(300, 300).unwrap();
        let cfg = Config::default();

        let stroke = paint_random_trace(&mut ctx, &mut canvas, &cfg).unwrap();

        assert!((30.0..270.0).contains(&stroke.start.x));
        assert!((30.0..270.0).contains(&stroke.start.y));
        assert_eq!(stroke.base_color.g, 0.0);
        assert_eq!(stroke.base_color.b, 200.0);
        assert!(stroke.n_bristles > 0);
        assert!(canvas.data().chunks(4).any(|p| p[3] > 0));
    }

    #[test]
    fn repeated_strokes_are_reproducible() {
        let render = || {
            let mut ctx = SimContext::seeded(99);
            let mut canvas = Canvas::new(200, 200).unwrap();
            let cfg = Config::default();
            for _ in 0..3 {
                paint_random_trace(&mut ctx, &mut canvas, &cfg).unwrap();
            }
            canvas.data().to_vec()
        };
        assert_eq!(render(), render());
    }
}
