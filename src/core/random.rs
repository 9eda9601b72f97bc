//! core::random
//!
//! Injectable random source for catalog assignment and stock quantities.
//!
//! # Design
//!
//! The catalog populator only ever needs two things: a uniform index over
//! a bounded sequence, and a uniform integer in a closed range. Both are
//! expressed through [`RandomSource`] so tests can force determinism with
//! [`SequenceRandom`] or a fixed seed.
//!
//! # Example
//!
//! ```
//! use marketseed::core::random::{pick, RandomSource, StdRandom};
//!
//! let rng = StdRandom::seeded(7);
//! let pool = ["a", "b", "c"];
//! let chosen = pick(&rng, &pool).unwrap();
//! assert!(pool.contains(chosen));
//!
//! let qty = rng.in_range(1, 50);
//! assert!((1..=50).contains(&qty));
//! ```

use std::fmt::Debug;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform random numbers.
///
/// Implementations must be `Send + Sync` so independent pipeline steps can
/// share one source across tasks.
pub trait RandomSource: Send + Sync + Debug {
    /// Uniform index in `0..len`. Returns `None` when `len == 0`.
    fn index(&self, len: usize) -> Option<usize>;

    /// Uniform integer in the closed range `[low, high]`.
    ///
    /// If `low > high` the bounds are swapped.
    fn in_range(&self, low: u32, high: u32) -> u32;
}

/// Pick a uniformly random element of `items`.
///
/// Returns `None` for an empty slice.
pub fn pick<'a, T>(rng: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    rng.index(items.len()).and_then(|i| items.get(i))
}

/// Non-cryptographic generator backed by `rand`'s `StdRng`.
#[derive(Debug)]
pub struct StdRandom {
    rng: Mutex<StdRng>,
}

impl StdRandom {
    /// Seed from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seed deterministically.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seed from `seed` if given, otherwise from the operating system.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os(),
        }
    }
}

impl RandomSource for StdRandom {
    fn index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Some(rng.random_range(0..len))
    }

    fn in_range(&self, low: u32, high: u32) -> u32 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(low..=high)
    }
}

/// Replays a fixed sequence of raw values, cycling when exhausted.
///
/// `index(len)` yields `value % len`; `in_range(low, high)` yields
/// `low + value % (high - low + 1)`. Handy for asserting exact assignments.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<u64>,
    cursor: Mutex<usize>,
}

impl SequenceRandom {
    /// Create a sequence source. An empty sequence always yields zero.
    pub fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            cursor: Mutex::new(0),
        }
    }

    fn next_value(&self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        let value = self.values[*cursor % self.values.len()];
        *cursor += 1;
        value
    }
}

impl RandomSource for SequenceRandom {
    fn index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.next_value() % len as u64) as usize)
    }

    fn in_range(&self, low: u32, high: u32) -> u32 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let span = u64::from(high - low) + 1;
        low + (self.next_value() % span) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_yields_none() {
        let rng = StdRandom::seeded(1);
        assert_eq!(rng.index(0), None);
        assert!(pick::<u8>(&rng, &[]).is_none());
    }

    #[test]
    fn seeded_sources_are_deterministic() {
        let a = StdRandom::seeded(99);
        let b = StdRandom::seeded(99);
        let xs: Vec<_> = (0..20).map(|_| a.in_range(1, 50)).collect();
        let ys: Vec<_> = (0..20).map(|_| b.in_range(1, 50)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn in_range_is_inclusive_and_bounded() {
        let rng = StdRandom::seeded(3);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..5_000 {
            let v = rng.in_range(1, 5);
            assert!((1..=5).contains(&v));
            seen_low |= v == 1;
            seen_high |= v == 5;
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn swapped_bounds_are_normalized() {
        let rng = StdRandom::seeded(3);
        for _ in 0..100 {
            assert!((3..=9).contains(&rng.in_range(9, 3)));
        }
    }

    #[test]
    fn sequence_replays_and_cycles() {
        let rng = SequenceRandom::new(vec![0, 4, 7]);
        assert_eq!(rng.index(3), Some(0));
        assert_eq!(rng.index(3), Some(1));
        assert_eq!(rng.index(3), Some(1));
        assert_eq!(rng.index(3), Some(0));
    }

    #[test]
    fn sequence_range_maps_into_bounds() {
        let rng = SequenceRandom::new(vec![0, 49, 50]);
        assert_eq!(rng.in_range(1, 50), 1);
        assert_eq!(rng.in_range(1, 50), 50);
        assert_eq!(rng.in_range(1, 50), 1);
    }
}
