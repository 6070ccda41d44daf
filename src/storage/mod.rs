// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bit-storage capability contract.
//!
//! A [`BloomFilter`](crate::bloom::BloomFilter) never owns a bit array. It
//! computes positions and hands them to a [`BitStorage`] collaborator, which
//! may be an in-memory bitset, a memory-mapped file or a remote service.
//! Every filter operation makes exactly one call into the storage.
//!
//! Three in-memory backends ship with the crate:
//!
//! - [`AtomicBitSet`]: lock-free, one `AtomicU64` per word.
//! - [`LockedBitSet`]: words behind a read/write lock, with word snapshots
//!   for callers that persist the array themselves.
//! - [`SparseBitSet`]: materialises only the words that have been touched.

use std::sync::Arc;

use crate::error::StorageError;

mod atomic;
mod locked;
mod sparse;

pub use atomic::AtomicBitSet;
pub use locked::LockedBitSet;
pub use sparse::SparseBitSet;

/// Number of bits held by one storage word.
pub(crate) const WORD_BITS: u64 = 64;

/// Capability contract for the array of bits backing a Bloom filter.
///
/// Implementations must hold at least `m` bits for the filter they serve.
/// Concurrency guarantees, if any, belong to the implementation: concurrent
/// `set` calls must never lose a bit and `test` must never observe a torn
/// bit, but a `test` across several positions need not be one snapshot.
pub trait BitStorage {
    /// Sets every named bit to 1.
    ///
    /// Idempotent. Must never clear a bit.
    fn set(&self, positions: &[u64]) -> Result<(), StorageError>;

    /// Returns `true` iff every named bit currently reads as 1.
    ///
    /// Returns an error, rather than `false`, when the check could not be
    /// performed at all.
    fn test(&self, positions: &[u64]) -> Result<bool, StorageError>;
}

impl<S: BitStorage + ?Sized> BitStorage for &S {
    fn set(&self, positions: &[u64]) -> Result<(), StorageError> {
        (**self).set(positions)
    }

    fn test(&self, positions: &[u64]) -> Result<bool, StorageError> {
        (**self).test(positions)
    }
}

impl<S: BitStorage + ?Sized> BitStorage for Arc<S> {
    fn set(&self, positions: &[u64]) -> Result<(), StorageError> {
        (**self).set(positions)
    }

    fn test(&self, positions: &[u64]) -> Result<bool, StorageError> {
        (**self).test(positions)
    }
}

impl<S: BitStorage + ?Sized> BitStorage for Box<S> {
    fn set(&self, positions: &[u64]) -> Result<(), StorageError> {
        (**self).set(positions)
    }

    fn test(&self, positions: &[u64]) -> Result<bool, StorageError> {
        (**self).test(positions)
    }
}

/// Splits a bit position into its word index and the mask within that word.
#[inline]
pub(crate) fn word_and_mask(position: u64) -> (usize, u64) {
    ((position / WORD_BITS) as usize, 1u64 << (position % WORD_BITS))
}

/// Number of words needed to hold `bits` bits.
#[inline]
pub(crate) fn words_for(bits: u64) -> usize {
    bits.div_ceil(WORD_BITS) as usize
}

/// Fails with [`StorageError::OutOfRange`] on the first position not below `capacity`.
pub(crate) fn check_range(positions: &[u64], capacity: u64) -> Result<(), StorageError> {
    match positions.iter().find(|&&position| position >= capacity) {
        Some(&position) => Err(StorageError::OutOfRange { position, capacity }),
        None => Ok(()),
    }
}
