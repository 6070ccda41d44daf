// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bit storage guarded by a read/write lock.

use parking_lot::RwLock;

use super::{check_range, word_and_mask, words_for, BitStorage};
use crate::error::StorageError;

/// A bit array of plain `u64` words behind a [`parking_lot::RwLock`].
///
/// Each `set` takes the write lock once for all positions and each `test`
/// takes the read lock once, so a single call sees a consistent array. The
/// word snapshot accessors let a caller persist the array next to the
/// filter's `m` and `k` and rebuild it later.
#[derive(Debug)]
pub struct LockedBitSet {
    words: RwLock<Vec<u64>>,
    capacity: u64,
}

impl LockedBitSet {
    /// Create a bit array holding `bits` bits, all zero.
    pub fn new(bits: u64) -> Self {
        Self {
            words: RwLock::new(vec![0; words_for(bits)]),
            capacity: bits,
        }
    }

    /// Rebuild a bit array from words previously taken with [`to_words`](Self::to_words).
    ///
    /// Fails when the word count does not match `bits`.
    pub fn from_words(bits: u64, words: Vec<u64>) -> Result<Self, StorageError> {
        let expected = words_for(bits);
        if words.len() != expected {
            return Err(StorageError::Other(format!(
                "expected {expected} words for {bits} bits, got {}",
                words.len()
            )));
        }

        Ok(Self {
            words: RwLock::new(words),
            capacity: bits,
        })
    }

    /// Number of addressable bits.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Copy of the current words, lowest bit positions first.
    pub fn to_words(&self) -> Vec<u64> {
        self.words.read().clone()
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> u64 {
        self.words
            .read()
            .iter()
            .map(|word| word.count_ones() as u64)
            .sum()
    }
}

impl BitStorage for LockedBitSet {
    fn set(&self, positions: &[u64]) -> Result<(), StorageError> {
        check_range(positions, self.capacity)?;

        let mut words = self.words.write();
        for &position in positions {
            let (index, mask) = word_and_mask(position);
            words[index] |= mask;
        }

        Ok(())
    }

    fn test(&self, positions: &[u64]) -> Result<bool, StorageError> {
        check_range(positions, self.capacity)?;

        let words = self.words.read();
        Ok(positions.iter().all(|&position| {
            let (index, mask) = word_and_mask(position);
            words[index] & mask != 0
        }))
    }
}
