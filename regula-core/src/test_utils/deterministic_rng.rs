//! Deterministic randomness for reproducible tests
//!
//! [`ScriptedRandom`] replays queued draws so a test can force one branch
//! of a simulated outcome. Once a queue runs dry it falls back to a seeded
//! generator, so only the draws a test cares about need scripting.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::random::{RandomSource, SeededRandom};

/// Default seed for deterministic tests
pub const DEFAULT_TEST_SEED: u64 = 42;

/// Seeded source with the default test seed
pub fn test_rng() -> Arc<SeededRandom> {
    test_rng_with_seed(DEFAULT_TEST_SEED)
}

pub fn test_rng_with_seed(seed: u64) -> Arc<SeededRandom> {
    Arc::new(SeededRandom::new(seed))
}

/// Random source replaying scripted values
#[derive(Debug)]
pub struct ScriptedRandom {
    floats: Mutex<VecDeque<f64>>,
    integers: Mutex<VecDeque<u32>>,
    fallback: SeededRandom,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_TEST_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            floats: Mutex::new(VecDeque::new()),
            integers: Mutex::new(VecDeque::new()),
            fallback: SeededRandom::new(seed),
        }
    }

    /// Queue values returned by `next_f64`, in order
    pub fn with_floats(self, values: impl IntoIterator<Item = f64>) -> Self {
        self.push_floats(values);
        self
    }

    /// Queue values returned by `next_below`, in order
    pub fn with_integers(self, values: impl IntoIterator<Item = u32>) -> Self {
        self.push_integers(values);
        self
    }

    pub fn push_floats(&self, values: impl IntoIterator<Item = f64>) {
        self.floats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend(values);
    }

    pub fn push_integers(&self, values: impl IntoIterator<Item = u32>) {
        self.integers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend(values);
    }

    /// Scripted values not consumed yet
    pub fn remaining(&self) -> usize {
        self.floats.lock().unwrap_or_else(|p| p.into_inner()).len()
            + self.integers.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl Default for ScriptedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        let scripted = self
            .floats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        scripted.unwrap_or_else(|| self.fallback.next_f64())
    }

    /// Scripted values at or above `upper` are clamped to `upper - 1`
    fn next_below(&self, upper: u32) -> u32 {
        let scripted = self
            .integers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        match scripted {
            Some(value) => value.min(upper.saturating_sub(1)),
            None => self.fallback.next_below(upper),
        }
    }

    fn fill_bytes(&self, buf: &mut [u8]) {
        self.fallback.fill_bytes(buf);
    }
}
