//! Deterministic random number generation for synthetic batches.
//!
//! RULE: batch generation never calls a platform RNG.
//! All randomness flows through SeededRng instances derived from
//! the seed handed to the generator.
//!
//! Each employee attribute gets its own stream, seeded from
//! (master_seed XOR stream_index). Adding a new attribute therefore
//! never changes the values drawn for existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct SeededRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SeededRng {
    /// Create a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n). Returns 0 when `n` is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi]. Returns `lo` when the range is empty.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Pick one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_u64_below(items.len() as u64) as usize;
        items.get(index)
    }
}

/// All attribute streams for one generated batch.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, stream: RngStream) -> SeededRng {
        SeededRng::new(self.master_seed, stream as u64).with_name(stream.name())
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    Identity = 0,
    Position = 1,
    Tenure = 2,
    Engagement = 3,
    Proficiency = 4,
    Keys = 5,
}

impl RngStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Position => "position",
            Self::Tenure => "tenure",
            Self::Engagement => "engagement",
            Self::Proficiency => "proficiency",
            Self::Keys => "keys",
        }
    }
}
