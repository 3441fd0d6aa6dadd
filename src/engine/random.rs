//! Random sources for the draw.
//!
//! The engine only ever asks for uniform samples in `[0, 1)`, so swapping
//! the source is enough to make every draw reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplier of uniform samples in `[0, 1)`.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Production source backed by `StdRng`.
pub struct EntropyRandom {
    rng: StdRng,
}

impl EntropyRandom {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixed seed, for replaying a session.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Number of samples handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
