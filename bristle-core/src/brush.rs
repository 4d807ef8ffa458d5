//! The bristle ensemble.
//!
//! A [`Brush`] follows a sequence of positions, smooths them over a short
//! window to estimate its travel direction, and places one anchor per bristle
//! on a line across that direction. Anchors only exist once the window has
//! filled (the warm-up); until then nothing is painted.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::{
    bristle::{Bristle, heading},
    canvas::Surface,
    color::Rgba,
    config::BrushConfig,
    context::SimContext,
    noise::{Noise1D, ValueNoise1D},
    types::BristleId,
};

/// Which side of the travel direction the bristle offsets are laid out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationSign {
    Positive,
    Negative,
}

impl RotationSign {
    pub fn flipped(self) -> Self {
        match self {
            RotationSign::Positive => RotationSign::Negative,
            RotationSign::Negative => RotationSign::Positive,
        }
    }

    pub fn value(self) -> f32 {
        match self {
            RotationSign::Positive => 1.0,
            RotationSign::Negative => -1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Brush {
    cfg: BrushConfig,
    noise: ValueNoise1D,

    position: Vec2,
    average_position: Vec2,
    history: Vec<Vec2>,
    updates_counter: usize,

    direction_angle: f32,
    rotation: RotationSign,

    horizontal_noise: f32,
    horizontal_noise_seed: f32,

    offsets: Vec<Vec2>,
    anchors: Vec<Vec2>,
    bristles: Vec<Bristle>,
}

impl Brush {
    /// Creates a brush with the default [`BrushConfig`].
    pub fn new(position: Vec2, size: f32, ctx: &mut SimContext) -> Self {
        Self::with_config(position, size, BrushConfig::default(), ctx)
    }

    /// Creates a brush of roughly `size` bristles spread over a head `size`
    /// wide.
    ///
    /// Uniform samples are drawn from `ctx` in a fixed order: the bristle
    /// count, the jitter noise seed, then a horizontal and vertical offset for
    /// each bristle.
    ///
    /// A `positions_for_average` of 0 is treated as 1.
    pub fn with_config(
        position: Vec2,
        size: f32,
        mut cfg: BrushConfig,
        ctx: &mut SimContext,
    ) -> Self {
        cfg.positions_for_average = cfg.positions_for_average.max(1);
        let density = ctx.uniform(cfg.bristle_density_min, cfg.bristle_density_max);
        let n_bristles = (size * density).floor().max(0.0) as usize;
        let horizontal_noise = (0.3 * size).min(cfg.max_horizontal_noise);
        let horizontal_noise_seed = ctx.uniform(0.0, 1000.0);

        let bristle_length = size.min(cfg.max_bristle_length);
        let bristle_thickness = (0.8 * bristle_length).min(cfg.max_bristle_thickness);

        let mut offsets = Vec::with_capacity(n_bristles);
        let mut bristles = Vec::with_capacity(n_bristles);
        for _ in 0..n_bristles {
            let horizontal = size * ctx.uniform(-0.5, 0.5);
            let vertical = cfg.vertical_noise * ctx.uniform(-0.5, 0.5);
            offsets.push(Vec2::new(horizontal, vertical));
            bristles.push(Bristle::new(Vec2::ZERO, bristle_length, bristle_thickness));
        }

        let mut history = Vec::with_capacity(cfg.positions_for_average);
        history.push(position);

        Self {
            cfg,
            noise: ctx.noise_field().clone(),
            position,
            average_position: position,
            history,
            updates_counter: 1,
            direction_angle: 0.0,
            rotation: RotationSign::Positive,
            horizontal_noise,
            horizontal_noise_seed,
            offsets,
            anchors: vec![Vec2::ZERO; n_bristles],
            bristles,
        }
    }

    pub fn n_bristles(&self) -> usize {
        self.bristles.len()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn average_position(&self) -> Vec2 {
        self.average_position
    }

    pub fn updates_counter(&self) -> usize {
        self.updates_counter
    }

    pub fn direction_angle(&self) -> f32 {
        self.direction_angle
    }

    pub fn rotation_sign(&self) -> RotationSign {
        self.rotation
    }

    pub fn horizontal_noise(&self) -> f32 {
        self.horizontal_noise
    }

    pub fn offsets(&self) -> &[Vec2] {
        &self.offsets
    }

    pub fn bristle(&self, id: BristleId) -> &Bristle {
        &self.bristles[id]
    }

    pub fn bristles(&self) -> &[Bristle] {
        &self.bristles
    }

    /// Whether the averaging window has filled and anchors are defined.
    pub fn is_warmed_up(&self) -> bool {
        self.updates_counter >= self.cfg.positions_for_average
    }

    /// Hard reset to `position`: drops the travel history and direction.
    ///
    /// Bristle geometry is left alone; it is collapsed onto the anchors when
    /// the next warm-up completes.
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
        self.average_position = position;
        self.history.clear();
        self.history.push(position);
        self.updates_counter = 1;
        self.direction_angle = 0.0;
        self.rotation = RotationSign::Positive;
    }

    /// Advances the brush to `position`.
    ///
    /// Once warmed up the anchors are recomputed. With `propagate` set the
    /// bristles follow them too: they are collapsed onto their anchors on the
    /// step the warm-up completes and dragged on every later step.
    pub fn update(&mut self, position: Vec2, propagate: bool) {
        let window = self.cfg.positions_for_average;
        self.position = position;

        if self.history.len() < window {
            self.history.push(position);
        } else {
            self.history[self.updates_counter % window] = position;
        }
        self.updates_counter += 1;

        let previous_average = self.average_position;
        let sum = self.history.iter().fold(Vec2::ZERO, |acc, &p| acc + p);
        self.average_position = sum / self.history.len() as f32;

        let previous_angle = self.direction_angle;
        self.direction_angle = heading(self.average_position - previous_average);

        // Sharp turns swap the side the bristles trail on.
        let cos_change = self.direction_angle.cos() * previous_angle.cos()
            + self.direction_angle.sin() * previous_angle.sin();
        if cos_change < self.cfg.sharp_turn_cos {
            self.rotation = self.rotation.flipped();
        }

        if !self.is_warmed_up() {
            return;
        }

        self.calculate_anchor_positions();

        if propagate {
            if self.updates_counter == window {
                for (bristle, &anchor) in self.bristles.iter_mut().zip(&self.anchors) {
                    bristle.move_to(anchor);
                }
            } else {
                for (bristle, &anchor) in self.bristles.iter_mut().zip(&self.anchors) {
                    bristle.update(anchor);
                }
            }
        }
    }

    /// Places every anchor at its fixed offset, jittered along the brush
    /// width and rotated from the travel frame into world space.
    fn calculate_anchor_positions(&mut self) {
        let angle = self.rotation.value() * FRAC_PI_2 + self.direction_angle;
        let (sin, cos) = angle.sin_cos();
        let noise_pos =
            self.horizontal_noise_seed + self.cfg.noise_speed * self.updates_counter as f32;

        for (i, (anchor, offset)) in self.anchors.iter_mut().zip(&self.offsets).enumerate() {
            let jitter = self.noise.sample(noise_pos + 0.1 * i as f32) - 0.5;
            let x = offset.x + self.horizontal_noise * jitter;
            let y = offset.y;
            *anchor = self.position + Vec2::new(x * cos - y * sin, x * sin + y * cos);
        }
    }

    /// Current anchors, or `None` during warm-up.
    pub fn anchor_positions(&self) -> Option<&[Vec2]> {
        self.is_warmed_up().then_some(self.anchors.as_slice())
    }

    /// Paints every bristle in index order, bristle `i` with `colors[i]`.
    /// Does nothing during warm-up.
    pub fn paint(&self, colors: &[Rgba], surface: &mut impl Surface) {
        if !self.is_warmed_up() {
            return;
        }

        for (bristle, &color) in self.bristles.iter().zip(colors) {
            surface.set_stroke(color);
            bristle.paint(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bristle::tests::RecordingSurface;

    fn brush(size: f32, seed: u64) -> Brush {
        let mut ctx = SimContext::seeded(seed);
        Brush::new(Vec2::ZERO, size, &mut ctx)
    }

    fn rotate(v: Vec2, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
    }

    #[test]
    fn construction_derives_bristle_properties() {
        let b = brush(50.0, 7);

        assert!((55..65).contains(&b.n_bristles()), "n = {}", b.n_bristles());
        assert_eq!(b.offsets().len(), b.n_bristles());
        assert_eq!(b.horizontal_noise(), 8.0);

        for o in b.offsets() {
            assert!((-25.0..25.0).contains(&o.x));
            assert!((-4.0..4.0).contains(&o.y));
        }
        for bristle in b.bristles() {
            // Length min(50, 15) = 15, thickness min(12, 5) = 5.
            assert_eq!(bristle.n_links(), 5);
            assert_eq!(bristle.thicknesses()[0], 5.0);
            assert_eq!(bristle.head(), Vec2::ZERO);
        }

        assert_eq!(b.updates_counter(), 1);
        assert_eq!(b.rotation_sign(), RotationSign::Positive);
        assert!(b.anchor_positions().is_none());
    }

    #[test]
    fn small_brush_scales_down_limits() {
        let b = brush(4.0, 1);
        assert!((4..6).contains(&b.n_bristles()));
        assert!((b.horizontal_noise() - 1.2).abs() < 1e-6);
        for bristle in b.bristles() {
            assert_eq!(bristle.n_links(), 2);
            assert!((bristle.thicknesses()[0] - 3.2).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_builds_same_brush() {
        let a = brush(30.0, 11);
        let b = brush(30.0, 11);
        assert_eq!(a.n_bristles(), b.n_bristles());
        assert_eq!(a.offsets(), b.offsets());
    }

    #[test]
    fn average_is_exact_mean_during_warm_up() {
        let mut b = brush(10.0, 3);
        let seed = Vec2::new(2.0, 4.0);
        b.move_to(seed);

        let inputs = [
            Vec2::new(6.0, 4.0),
            Vec2::new(10.0, 8.0),
            Vec2::new(14.0, 8.0),
            Vec2::new(18.0, 12.0),
        ];
        let mut seen = vec![seed];
        for p in inputs {
            b.update(p, false);
            seen.push(p);
            let sum = seen.iter().fold(Vec2::ZERO, |acc, &q| acc + q);
            assert_eq!(b.average_position(), sum / seen.len() as f32);
        }

        // The window is full: the seed entry is replaced.
        b.update(Vec2::new(22.0, 12.0), false);
        let last_five = Vec2::new(6.0 + 10.0 + 14.0 + 18.0 + 22.0, 4.0 + 8.0 + 8.0 + 12.0 + 12.0);
        assert!((b.average_position() - last_five / 5.0).length() < 1e-5);
    }

    #[test]
    fn anchors_appear_after_warm_up() {
        let mut b = brush(20.0, 5);
        b.move_to(Vec2::ZERO);
        for i in 1..4 {
            b.update(Vec2::new(2.0 * i as f32, 0.0), false);
            assert!(b.anchor_positions().is_none(), "step {}", i);
        }
        b.update(Vec2::new(8.0, 0.0), false);
        assert_eq!(b.updates_counter(), 5);
        assert_eq!(b.anchor_positions().map(<[Vec2]>::len), Some(b.n_bristles()));
    }

    #[test]
    fn zero_averaging_window_acts_as_one() {
        let mut ctx = SimContext::seeded(6);
        let cfg = BrushConfig {
            positions_for_average: 0,
            ..BrushConfig::default()
        };
        let mut b = Brush::with_config(Vec2::ZERO, 10.0, cfg, &mut ctx);

        b.update(Vec2::new(1.0, 0.0), true);
        b.update(Vec2::new(2.0, 0.0), true);

        assert_eq!(b.average_position(), Vec2::new(2.0, 0.0));
        assert!(b.is_warmed_up());
        assert!(b.anchor_positions().is_some());
    }

    #[test]
    fn move_to_resets_averaging_state() {
        let mut b = brush(20.0, 5);
        for i in 1..8 {
            b.update(Vec2::new(0.0, 3.0 * i as f32), false);
        }
        assert!(b.anchor_positions().is_some());

        let p = Vec2::new(100.0, 50.0);
        b.move_to(p);
        assert_eq!(b.position(), p);
        assert_eq!(b.average_position(), p);
        assert_eq!(b.updates_counter(), 1);
        assert_eq!(b.direction_angle(), 0.0);
        assert_eq!(b.rotation_sign(), RotationSign::Positive);
        assert!(b.anchor_positions().is_none());
    }

    #[test]
    fn rotation_flips_only_on_sharp_turns() {
        let mut b = brush(10.0, 2);
        b.move_to(Vec2::ZERO);

        // Straight ahead along +x: no change.
        b.update(Vec2::new(10.0, 0.0), false);
        assert_eq!(b.direction_angle(), 0.0);
        assert_eq!(b.rotation_sign(), RotationSign::Positive);

        // Reversal: cos = -1.
        b.update(Vec2::ZERO, false);
        assert!((b.direction_angle().abs() - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(b.rotation_sign(), RotationSign::Negative);

        // Keep going the same way: no flip.
        b.update(Vec2::new(-10.0, 0.0), false);
        assert_eq!(b.rotation_sign(), RotationSign::Negative);
    }

    #[test]
    fn gentle_turn_keeps_rotation_right_angle_flips() {
        let mut gentle = brush(10.0, 2);
        gentle.move_to(Vec2::ZERO);
        gentle.update(Vec2::new(10.0, 0.0), false);
        // Average moves from (5, 0) toward a point 60° off: cos = 0.5.
        let avg = gentle.average_position();
        let target_avg = avg + 5.0 * Vec2::new(60f32.to_radians().cos(), 60f32.to_radians().sin());
        gentle.update(target_avg * 3.0 - Vec2::new(10.0, 0.0), false);
        assert!((gentle.direction_angle() - 60f32.to_radians()).abs() < 1e-4);
        assert_eq!(gentle.rotation_sign(), RotationSign::Positive);

        let mut sharp = brush(10.0, 2);
        sharp.move_to(Vec2::ZERO);
        // First move straight up: cos(90°) = 0 < 0.3.
        sharp.update(Vec2::new(0.0, 10.0), false);
        assert_eq!(sharp.rotation_sign(), RotationSign::Negative);
    }

    #[test]
    fn stationary_update_has_zero_direction() {
        let mut b = brush(10.0, 4);
        b.move_to(Vec2::new(3.0, 3.0));
        b.update(Vec2::new(3.0, 3.0), false);
        assert_eq!(b.direction_angle(), 0.0);
        assert_eq!(b.rotation_sign(), RotationSign::Positive);
    }

    #[test]
    fn anchors_sit_at_rotated_jittered_offsets() {
        let mut b = brush(30.0, 9);
        b.move_to(Vec2::new(100.0, 100.0));
        for i in 1..=6 {
            b.update(Vec2::new(100.0 + 2.0 * i as f32, 100.0 + i as f32), false);
        }

        let angle = b.rotation_sign().value() * FRAC_PI_2 + b.direction_angle();
        let anchors = b.anchor_positions().unwrap().to_vec();
        let half_jitter = 0.5 * b.horizontal_noise();

        for (anchor, offset) in anchors.iter().zip(b.offsets()) {
            let local = rotate(*anchor - b.position(), -angle);
            assert!((local.y - offset.y).abs() < 1e-3);
            assert!((local.x - offset.x).abs() <= half_jitter + 1e-3);
        }
    }

    #[test]
    fn propagate_collapses_then_drags_bristles() {
        let mut b = brush(20.0, 6);
        b.move_to(Vec2::ZERO);
        for i in 1..=4 {
            b.update(Vec2::new(2.0 * i as f32, 0.0), true);
        }

        let anchors = b.anchor_positions().unwrap().to_vec();
        for (bristle, &anchor) in b.bristles().iter().zip(&anchors) {
            assert_eq!(bristle.head(), anchor);
            assert!(bristle.positions().iter().all(|&p| p == anchor));
        }

        b.update(Vec2::new(10.0, 1.0), true);
        let anchors = b.anchor_positions().unwrap().to_vec();
        for (bristle, &anchor) in b.bristles().iter().zip(&anchors) {
            assert_eq!(bristle.head(), anchor);
            let d = anchor.distance(bristle.positions()[0]);
            assert!((d - bristle.lengths()[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn without_propagation_bristles_stay_put() {
        let mut b = brush(20.0, 6);
        b.move_to(Vec2::ZERO);
        for i in 1..=8 {
            b.update(Vec2::new(2.0 * i as f32, 0.0), false);
        }
        assert!(b.bristles().iter().all(|br| br.head() == Vec2::ZERO));
    }

    #[test]
    fn paint_is_silent_during_warm_up_then_follows_index_order() {
        let mut b = brush(6.0, 8);
        let colors: Vec<Rgba> = (0..b.n_bristles())
            .map(|i| Rgba::opaque(i as f32, 0.0, 0.0))
            .collect();

        let mut surface = RecordingSurface::default();
        b.move_to(Vec2::ZERO);
        b.update(Vec2::new(1.0, 0.0), true);
        b.paint(&colors, &mut surface);
        assert!(surface.lines.is_empty());

        for i in 2..=6 {
            b.update(Vec2::new(i as f32, 0.0), true);
        }
        b.paint(&colors, &mut surface);

        let links = b.bristle(0).n_links();
        assert_eq!(surface.lines.len(), links * b.n_bristles());
        for (i, chunk) in surface.lines.chunks(links).enumerate() {
            assert!(chunk.iter().all(|l| l.3 == colors[i]));
            assert_eq!(chunk[0].0, b.bristle(i).head());
        }
    }
}
