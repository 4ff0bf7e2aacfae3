//! Randomness source behind every simulated outcome
//!
//! Moderation tags, review verdicts, report counts, size labels and the
//! tokens handed to users all draw from a [`RandomSource`]. Production code
//! uses [`ThreadRandom`]; reproducible runs use [`SeededRandom`]; tests can
//! force individual branches with `test_utils::ScriptedRandom`.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;

/// Source of random draws
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform integer in `[0, upper)`; `upper` must be non-zero
    fn next_below(&self, upper: u32) -> u32;

    /// Fill `buf` with random bytes
    fn fill_bytes(&self, buf: &mut [u8]);

    /// True when a uniform draw lands strictly above `threshold`
    ///
    /// `exceeds(0.2)` succeeds with probability 0.8.
    fn exceeds(&self, threshold: f64) -> bool {
        self.next_f64() > threshold
    }
}

/// Thread-local generator from `rand`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn next_below(&self, upper: u32) -> u32 {
        rand::rng().random_range(0..upper)
    }

    fn fill_bytes(&self, buf: &mut [u8]) {
        rand::rng().fill_bytes(buf);
    }
}

/// Seeded generator, reproducible across runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned lock only means another draw panicked; the generator
        // state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.with_rng(|rng| rng.random::<f64>())
    }

    fn next_below(&self, upper: u32) -> u32 {
        self.with_rng(|rng| rng.random_range(0..upper))
    }

    fn fill_bytes(&self, buf: &mut [u8]) {
        self.with_rng(|rng| rng.fill_bytes(buf))
    }
}
