// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Sparse bit storage for very large filters.

use dashmap::DashMap;

use super::{check_range, word_and_mask, BitStorage};
use crate::error::StorageError;

/// A bit array that only allocates the 64-bit words that have been written.
///
/// Suited to filters whose `m` is far larger than the number of bits that
/// will ever be set, e.g. a filter sized for a billion items that is still
/// warming up. Words live in a sharded [`DashMap`], so writers touching
/// different shards never contend.
#[derive(Debug)]
pub struct SparseBitSet {
    words: DashMap<usize, u64>,
    capacity: u64,
}

impl SparseBitSet {
    /// Create a sparse bit array addressing `bits` bits, all zero.
    pub fn new(bits: u64) -> Self {
        Self {
            words: DashMap::new(),
            capacity: bits,
        }
    }

    /// Number of addressable bits.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of words currently materialised.
    pub fn resident_words(&self) -> usize {
        self.words.len()
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> u64 {
        self.words
            .iter()
            .map(|word| word.value().count_ones() as u64)
            .sum()
    }
}

impl BitStorage for SparseBitSet {
    fn set(&self, positions: &[u64]) -> Result<(), StorageError> {
        check_range(positions, self.capacity)?;

        for &position in positions {
            let (index, mask) = word_and_mask(position);
            *self.words.entry(index).or_insert(0) |= mask;
        }

        Ok(())
    }

    fn test(&self, positions: &[u64]) -> Result<bool, StorageError> {
        check_range(positions, self.capacity)?;

        Ok(positions.iter().all(|&position| {
            let (index, mask) = word_and_mask(position);
            self.words
                .get(&index)
                .map_or(false, |word| *word & mask != 0)
        }))
    }
}
