//! Shared helpers for integration tests and benchmarks.

#![allow(dead_code)]

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates `count` distinct keys of at most `bits` bits, in random order.
///
/// The count is capped at `2^bits` so a narrow width cannot loop forever.
pub fn unique_keys(count: usize, bits: u32, seed: u64) -> Vec<u64> {
    assert!((1..=64).contains(&bits));
    let count = if bits < usize::BITS.min(64) {
        count.min(1usize << bits)
    } else {
        count
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(count + count / 5);
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let key = rng.gen::<u64>() >> (64 - bits);
        if seen.insert(key) {
            keys.push(key);
        }
    }
    keys
}

/// Splits `keys` into `parts` contiguous, disjoint chunks.
pub fn partition(keys: &[u64], parts: usize) -> Vec<&[u64]> {
    let chunk = keys.len().div_ceil(parts).max(1);
    keys.chunks(chunk).collect()
}
