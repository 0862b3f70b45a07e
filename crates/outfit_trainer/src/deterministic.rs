//! Deterministic utilities for reproducible training
//!
//! Provides a seeded LCG, a seed mixer for deriving per-tree streams, and the
//! tie-breaker used when two splits score the same.

use std::num::Wrapping;

/// 64-bit linear congruential generator (Knuth MMIX constants)
///
/// Outputs are taken from the high 32 bits of the state.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Wrapping(seed),
        }
    }

    /// Generator for one tree of a forest
    pub fn for_tree(seed: u64, tree_idx: usize) -> Self {
        Self::new(mix64(seed, tree_idx as u64))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 >> 32) as u32
    }

    /// Uniform index in `[0, bound)`; returns 0 when `bound` is 0
    pub fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * bound as u64) >> 32) as usize
    }

    /// Random permutation of `0..n` (Fisher-Yates)
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut items: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
        items
    }

    /// Draw `n` indices from `[0, n)` with replacement
    pub fn bootstrap(&mut self, n: usize) -> Vec<usize> {
        (0..n).map(|_| self.next_index(n)).collect()
    }
}

/// Mix a seed with a stream index into a well-spread 64-bit seed
pub fn mix64(seed: u64, stream: u64) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;

    let mut h = seed.wrapping_add(PRIME3);
    h = h.wrapping_add(stream.wrapping_mul(PRIME1));
    h = h.rotate_left(31).wrapping_mul(PRIME2);

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Ordering key for equally good splits: lower feature first, then lower threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    /// Position of the threshold among the feature's candidate thresholds
    pub threshold_rank: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold_rank: usize) -> Self {
        Self {
            feature_idx,
            threshold_rank,
        }
    }
}
