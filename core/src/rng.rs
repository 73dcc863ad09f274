//! Deterministic random number generation for demo catalogs.
//!
//! RULE: catalog seeding never calls a platform RNG.
//! Each concern (names, dates, genres, metrics) draws from its own stream,
//! seeded from (master_seed XOR stream_index), so adding a field to one
//! stream never shifts the values another stream produces.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Stable stream slots. Indices must never change once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStream {
    Names = 0,
    Dates = 1,
    Genres = 2,
    Metrics = 3,
}

/// A named, deterministic RNG for a single stream.
pub struct SeedRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SeedRng {
    pub fn new(master_seed: u64, stream: SeedStream) -> Self {
        let derived_seed = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: stream.name(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` must be positive.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n.max(1)
    }

    /// Roll an integer in [low, high].
    pub fn range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        let span = (high - low).max(0) as u64 + 1;
        low + self.next_u64_below(span) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }
}

impl SeedStream {
    fn name(self) -> &'static str {
        match self {
            SeedStream::Names => "names",
            SeedStream::Dates => "dates",
            SeedStream::Genres => "genres",
            SeedStream::Metrics => "metrics",
        }
    }
}
