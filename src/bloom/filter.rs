// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Main implementation of the Bloom filter.

use tracing::{debug, trace, warn};

use crate::bloom::hash::IndexScheme;
use crate::bloom::params::{estimate, BloomParameters};
use crate::config::{FilterConfig, Validate};
use crate::error::{BloomError, BloomResult};
use crate::storage::BitStorage;

/// A Bloom filter over an external bit storage.
///
/// The filter itself only holds its parameters and the index scheme, none
/// of which change after construction. Every [`add`](Self::add) and
/// [`exists`](Self::exists) computes the item's positions and makes exactly
/// one call into the storage, whose errors are returned unchanged.
///
/// The storage handle is usually a reference or an `Arc`, so the caller
/// keeps ownership of the bit array and can share it.
///
/// # Examples
///
/// ```
/// use kilo_bloom::bloom::BloomFilter;
/// use kilo_bloom::storage::AtomicBitSet;
///
/// let params = kilo_bloom::bloom::estimate(100, 0.05).unwrap();
/// let bits = AtomicBitSet::new(params.bits);
///
/// let filter = BloomFilter::new(100, 0.05, &bits).unwrap();
/// filter.add("apple").unwrap();
///
/// assert!(filter.exists("apple").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct BloomFilter<S> {
    params: BloomParameters,
    scheme: IndexScheme,
    storage: S,
}

impl<S: BitStorage> BloomFilter<S> {
    /// Create a filter sized for `expected_items` at `false_positive_rate`.
    ///
    /// The storage must hold at least [`bits`](Self::bits) bits; compute the
    /// size up front with [`estimate`].
    pub fn new(expected_items: u64, false_positive_rate: f64, storage: S) -> BloomResult<Self> {
        let params = estimate(expected_items, false_positive_rate)?;
        Self::build(params, IndexScheme::default(), storage)
    }

    /// Create a filter from known parameters, e.g. ones persisted with a bit array.
    pub fn with_parameters(params: BloomParameters, storage: S) -> BloomResult<Self> {
        Self::build(params, IndexScheme::default(), storage)
    }

    /// Create a filter from a validated [`FilterConfig`].
    pub fn from_config(config: &FilterConfig, storage: S) -> BloomResult<Self> {
        config.validate()?;
        let params = config.parameters()?;
        Self::build(params, config.index_scheme, storage)
    }

    fn build(params: BloomParameters, scheme: IndexScheme, storage: S) -> BloomResult<Self> {
        let params = BloomParameters::new(params.bits, params.hashes)?;
        debug!(
            bits = params.bits,
            hashes = params.hashes,
            %scheme,
            "Created bloom filter"
        );
        Ok(Self {
            params,
            scheme,
            storage,
        })
    }

    /// Use `scheme` to map items to positions.
    pub fn with_scheme(mut self, scheme: IndexScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Record `item` in the filter.
    ///
    /// # Errors
    ///
    /// [`BloomError::Storage`] carrying the storage's error when the bits
    /// could not be set.
    pub fn add(&self, item: impl AsRef<[u8]>) -> BloomResult<()> {
        let item = item.as_ref();
        trace!(len = item.len(), "Adding item");

        let locations = self.locations(item);
        self.storage.set(&locations).map_err(|err| {
            warn!(error = %err, "Bit storage failed to set bits");
            BloomError::Storage(err)
        })
    }

    /// Returns `Ok(true)` if `item` may have been added, `Ok(false)` if it
    /// definitely was not.
    ///
    /// # Errors
    ///
    /// [`BloomError::Storage`] when the storage could not perform the check.
    /// The membership status is then unknown, which is not the same as absent.
    pub fn exists(&self, item: impl AsRef<[u8]>) -> BloomResult<bool> {
        let item = item.as_ref();
        trace!(len = item.len(), "Checking item");

        let locations = self.locations(item);
        self.storage.test(&locations).map_err(|err| {
            warn!(error = %err, "Bit storage failed to test bits");
            BloomError::Storage(err)
        })
    }

    /// The `k` bit positions `item` maps to, each in `[0, m)`.
    pub fn locations(&self, item: impl AsRef<[u8]>) -> Vec<u64> {
        self.scheme
            .locations(item.as_ref(), self.params.hashes, self.params.bits)
    }
}

impl<S> BloomFilter<S> {
    /// Total number of bits, `m`.
    pub fn bits(&self) -> u64 {
        self.params.bits
    }

    /// Number of hash rounds per item, `k`.
    pub fn hashes(&self) -> u32 {
        self.params.hashes
    }

    /// The filter's structural parameters.
    pub fn parameters(&self) -> BloomParameters {
        self.params
    }

    /// The scheme mapping items to positions.
    pub fn scheme(&self) -> IndexScheme {
        self.scheme
    }

    /// The storage handle.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage handle.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Expected false positive rate once `inserted` distinct items were added.
    pub fn expected_false_positive_rate(&self, inserted: u64) -> f64 {
        self.params.false_positive_rate(inserted)
    }
}
