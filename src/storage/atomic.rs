// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Lock-free in-memory bit storage.

use std::sync::atomic::{AtomicU64, Ordering};

use super::{check_range, word_and_mask, words_for, BitStorage};
use crate::error::StorageError;

/// A fixed-size bit array built on atomic words.
///
/// Setting a bit is a single `fetch_or`, so concurrent writers never lose
/// each other's bits and readers never see a partially written bit. Safe to
/// share between threads behind an `Arc` or a plain reference.
///
/// # Examples
///
/// ```
/// use kilo_bloom::storage::{AtomicBitSet, BitStorage};
///
/// let bits = AtomicBitSet::new(1_024);
/// bits.set(&[1, 500, 1_023]).unwrap();
///
/// assert!(bits.test(&[1, 500]).unwrap());
/// assert!(!bits.test(&[1, 2]).unwrap());
/// assert_eq!(bits.count_ones(), 3);
/// ```
#[derive(Debug)]
pub struct AtomicBitSet {
    words: Vec<AtomicU64>,
    capacity: u64,
}

impl AtomicBitSet {
    /// Create a bit array holding `bits` bits, all zero.
    pub fn new(bits: u64) -> Self {
        let words = (0..words_for(bits)).map(|_| AtomicU64::new(0)).collect();
        Self {
            words,
            capacity: bits,
        }
    }

    /// Number of addressable bits.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> u64 {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Relaxed).count_ones() as u64)
            .sum()
    }

    /// Fraction of bits set, between 0.0 and 1.0.
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.count_ones() as f64 / self.capacity as f64
    }
}

impl BitStorage for AtomicBitSet {
    fn set(&self, positions: &[u64]) -> Result<(), StorageError> {
        check_range(positions, self.capacity)?;

        for &position in positions {
            let (index, mask) = word_and_mask(position);
            self.words[index].fetch_or(mask, Ordering::Relaxed);
        }

        Ok(())
    }

    fn test(&self, positions: &[u64]) -> Result<bool, StorageError> {
        check_range(positions, self.capacity)?;

        Ok(positions.iter().all(|&position| {
            let (index, mask) = word_and_mask(position);
            self.words[index].load(Ordering::Relaxed) & mask != 0
        }))
    }
}
