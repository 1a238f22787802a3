//! Latency jitter sources
//!
//! The synthesizer draws one jitter sample per node. Production uses a
//! `StdRng` (seeded or from OS entropy); tests substitute a fixed value.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces a jitter sample uniformly distributed in `[-bound, bound]`
pub trait JitterSource {
    fn sample(&mut self, bound: f64) -> f64;
}

/// Uniform random jitter backed by a standard RNG
#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    /// Reproducible jitter for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Jitter seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, otherwise from entropy
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }
}

impl JitterSource for RandomJitter {
    fn sample(&mut self, bound: f64) -> f64 {
        if bound <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-bound..=bound)
    }
}

/// Always returns the same offset (clamped to the bound)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&mut self, bound: f64) -> f64 {
        self.0.clamp(-bound.abs(), bound.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_jitter_within_bound() {
        let mut jitter = RandomJitter::seeded(7);
        for _ in 0..1000 {
            let s = jitter.sample(5.0);
            assert!((-5.0..=5.0).contains(&s));
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = RandomJitter::seeded(42);
        let mut b = RandomJitter::seeded(42);

        let xs: Vec<f64> = (0..10).map(|_| a.sample(5.0)).collect();
        let ys: Vec<f64> = (0..10).map(|_| b.sample(5.0)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_zero_bound() {
        let mut jitter = RandomJitter::seeded(1);
        assert_eq!(jitter.sample(0.0), 0.0);
    }

    #[test]
    fn test_fixed_jitter_clamps() {
        let mut jitter = FixedJitter(9.0);
        assert_eq!(jitter.sample(5.0), 5.0);

        let mut jitter = FixedJitter(-2.5);
        assert_eq!(jitter.sample(5.0), -2.5);
    }
}
