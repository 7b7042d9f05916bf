//! Injectable randomness for the simulation.
//!
//! Every perturbation in the tick and every forecast draw pulls from a
//! [`RandomSource`], so a run is fully determined by the source it is given.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A source of uniform values in `[0, 1)`.
///
/// The helper methods are all expressed in terms of [`RandomSource::next_unit`],
/// which keeps draw order identical across implementations.
pub trait RandomSource {
    /// Returns the next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform value in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_unit()
    }

    /// Zero-centred jitter spanning `width`, i.e. `U(-width/2, width/2)`.
    fn symmetric(&mut self, width: f64) -> f64 {
        (self.next_unit() - 0.5) * width
    }

    /// Bernoulli draw that succeeds with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() > 1.0 - p
    }

    /// Uniform index in `0..len`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty range");
        let idx = (self.next_unit() * len as f64) as usize;
        idx.min(len - 1)
    }
}

/// Seeded pseudo-random source backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Creates a source whose sequence is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
///
/// Intended for tests that need to pin every draw.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    pos: usize,
}

impl ScriptedSource {
    /// Creates a source replaying `values` in order.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    /// Creates a source that always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            self.pos += 1;
            return 0.5;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
