use std::f32::consts::TAU;

use glam::Vec2;

use crate::{context::SimContext, noise::Noise1D};

/// A wandering path: constant speed, heading steered by coherent noise
/// around a random initial heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomWalk {
    pub heading: f32,
    pub noise_seed: f32,
    pub speed: f32,
    /// How far the noise domain advances per step. Small values give
    /// gently curving paths.
    pub heading_noise_scale: f32,
}

impl RandomWalk {
    /// Draws the initial heading and the steering noise seed from `ctx`.
    pub fn sample(ctx: &mut SimContext, speed: f32, heading_noise_scale: f32) -> Self {
        let heading = ctx.uniform(0.0, TAU);
        let noise_seed = ctx.uniform(0.0, 1000.0);
        Self {
            heading,
            noise_seed,
            speed,
            heading_noise_scale,
        }
    }

    /// Heading at step `i`, within half a turn of the initial heading.
    pub fn heading_at(&self, noise: &impl Noise1D, i: usize) -> f32 {
        let t = self.noise_seed + self.heading_noise_scale * i as f32;
        self.heading + TAU * (noise.sample(t) - 0.5)
    }

    /// `n_steps` points starting at `start`, consecutive points `speed` apart.
    pub fn points(&self, noise: &impl Noise1D, start: Vec2, n_steps: usize) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(n_steps);
        if n_steps == 0 {
            return points;
        }

        let mut position = start;
        points.push(position);
        for i in 1..n_steps {
            let angle = self.heading_at(noise, i);
            position += self.speed * Vec2::new(angle.cos(), angle.sin());
            points.push(position);
        }
        points
    }
}
