//! Pseudo-random sample source.
//!
//! Every render task owns its own sampler; nothing here is shared between
//! threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tern_math::Vec2;

/// Stream of uniform random numbers seeded deterministically.
#[derive(Clone, Debug)]
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Create a sampler from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sampler for one render bucket in one progressive pass.
    ///
    /// The seed mixes the render seed, bucket index and pass number so
    /// buckets never share a stream and successive passes draw fresh samples.
    pub fn for_tile(seed: u64, tile: usize, pass: u32) -> Self {
        let mixed = splitmix64(seed ^ splitmix64(((pass as u64) << 32) | tile as u64));
        Self::new(mixed)
    }

    /// Uniform value in [0, 1).
    #[inline]
    pub fn randf(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform value in [min, max).
    #[inline]
    pub fn randf_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.randf()
    }

    /// Uniform integer in [0, max). `max` must be non-zero.
    #[inline]
    pub fn randi(&mut self, max: usize) -> usize {
        debug_assert!(max > 0, "randi called with an empty range");
        self.rng.gen_range(0..max)
    }

    /// Two independent values in [0, 1).
    #[inline]
    pub fn rand_vec2(&mut self) -> Vec2 {
        Vec2::new(self.randf(), self.randf())
    }

    /// Pick one element uniformly. Returns `None` for an empty slice.
    pub fn select<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.randi(items.len());
        items.get(index)
    }
}

/// SplitMix64 finalizer, used to decorrelate neighbouring seeds.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
