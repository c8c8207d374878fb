//! Uniform random draws for the stochastic transition rule
//!
//! The transition engine never touches a global RNG. Each worker owns one
//! [`DrawSource`]; tests substitute [`FixedDraw`] or [`ScriptedDraws`] to pin
//! every draw to a known value.

use crate::config::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Golden-ratio increment used to give each worker its own seed
const RANK_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Source of uniform values in `[0, 1)`
pub trait DrawSource {
    fn next_draw(&mut self) -> f64;
}

/// Pseudo-random draws from a seedable `StdRng`
#[derive(Debug, Clone)]
pub struct SeededDraws {
    rng: StdRng,
}

impl SeededDraws {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible draws seeded from the operating system
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl DrawSource for SeededDraws {
    #[inline]
    fn next_draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Every draw returns the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraw(pub f64);

impl DrawSource for FixedDraw {
    #[inline]
    fn next_draw(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    values: Vec<f64>,
    next: usize,
    consumed: usize,
}

impl ScriptedDraws {
    /// # Panics
    ///
    /// Panics if `values` is empty
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "ScriptedDraws needs at least one value");
        Self {
            values,
            next: 0,
            consumed: 0,
        }
    }

    /// Total number of draws taken so far
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl DrawSource for ScriptedDraws {
    fn next_draw(&mut self) -> f64 {
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        self.consumed += 1;
        value
    }
}

/// Draw source for worker `rank` under the configured random source
#[must_use]
pub fn worker_draws(source: RandomSource, rank: usize) -> Box<dyn DrawSource + Send> {
    match source {
        RandomSource::Entropy => Box::new(SeededDraws::from_entropy()),
        RandomSource::Seeded(seed) => Box::new(SeededDraws::from_seed(
            seed ^ (rank as u64).wrapping_mul(RANK_SEED_STRIDE),
        )),
        RandomSource::Fixed(value) => Box::new(FixedDraw(value)),
    }
}
