//! A simple pseudorandom number generator.
//!
//! SplitMix64, after the public-domain reference implementation by Vigna
//! (<https://prng.di.unimi.it/splitmix64.c>), wired to the [rand_core]
//! traits.
//!
//! The CDCL engine keeps a generator to settle polarity leans. The engine is
//! parameterised to anything satisfying [Rng](rand::Rng), though defaults to
//! [SplitMix64] from a fixed seed so that identical queries repeat
//! identically.

use rand_core::{impls, RngCore, SeedableRng};

/// The generator: a single word of state.
#[derive(Clone, Debug, Default)]
pub struct SplitMix64 {
    state: u64,
}

impl RngCore for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u64::from_le_bytes(seed),
        }
    }
}
