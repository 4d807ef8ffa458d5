//! Seeded coherent noise used for bristle jitter and color variance.
//!
//! [`ValueNoise1D`] samples a ring of random lattice values, smoothly
//! interpolates between neighbours and sums [`OCTAVES`] layers with
//! halving amplitude. Every sample lies in `[0, 1)`.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Trait for 1D noise functions.
pub trait Noise1D {
    /// Sample the noise at position x. The result lies in `[0, 1)`.
    fn sample(&self, x: f32) -> f32;
}

const LATTICE_BITS: u32 = 12;
const LATTICE_SIZE: usize = 1 << LATTICE_BITS;
const LATTICE_MASK: i64 = LATTICE_SIZE as i64 - 1;

/// Number of layers summed per sample.
pub const OCTAVES: u32 = 4;

/// Amplitude multiplier between consecutive layers. The first layer already
/// carries this weight, so the total weight stays below one.
pub const FALLOFF: f32 = 0.5;

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// 1D layered value noise over a seeded lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNoise1D {
    lattice: Vec<f32>,
}

impl ValueNoise1D {
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let lattice = (0..LATTICE_SIZE).map(|_| rng.random::<f32>()).collect();
        Self { lattice }
    }

    #[inline]
    fn lattice_at(&self, i: i64) -> f32 {
        self.lattice[(i & LATTICE_MASK) as usize]
    }

    fn layer(&self, x: f32) -> f32 {
        let floor = x.floor();
        let xi = floor as i64;
        let u = fade(x - floor);
        lerp(self.lattice_at(xi), self.lattice_at(xi + 1), u)
    }
}

impl Default for ValueNoise1D {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Noise1D for ValueNoise1D {
    fn sample(&self, x: f32) -> f32 {
        if !x.is_finite() {
            return 0.0;
        }

        let mut value = 0.0;
        let mut amplitude = FALLOFF;
        let mut frequency = 1.0;

        for _ in 0..OCTAVES {
            value += self.layer(x * frequency) * amplitude;
            amplitude *= FALLOFF;
            frequency *= 2.0;
        }

        value
    }
}
