use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::noise::{Noise1D, ValueNoise1D};

/// Owned source of randomness for one simulation.
///
/// A [`crate::brush::Brush`] or [`crate::trace::Trace`] draws its uniform
/// samples from here during construction and keeps a copy of the noise
/// field, so two contexts built from the same seed reproduce the same stroke.
#[derive(Debug, Clone)]
pub struct SimContext {
    rng: StdRng,
    noise: ValueNoise1D,
}

impl SimContext {
    /// Seeds both the uniform generator and the noise field from one value.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: ValueNoise1D::with_seed(seed),
        }
    }

    /// Uniform sample in `[min, max)`. Returns `min` for an empty range.
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.random_range(min..max)
        } else {
            min
        }
    }

    /// Coherent noise sample in `[0, 1)`.
    pub fn noise(&self, t: f32) -> f32 {
        self.noise.sample(t)
    }

    pub fn noise_field(&self) -> &ValueNoise1D {
        &self.noise
    }
}
