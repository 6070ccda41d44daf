// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bloom filter over pluggable bit storage.
//!
//! A space-efficient probabilistic set: [`BloomFilter::exists`] never
//! reports an added item as absent, and reports a never-added item as
//! present with a probability close to the configured false positive rate.
//!
//! # Components
//!
//! - [`estimate`] turns an expected item count and a target false positive
//!   rate into the bit count `m` and hash round count `k`.
//! - [`IndexScheme`] maps an item's bytes to `k` positions in `[0, m)`.
//! - [`BloomFilter`] ties both to a [`BitStorage`](crate::storage::BitStorage)
//!   collaborator that actually holds the bits.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kilo_bloom::bloom::{estimate, BloomFilter, IndexScheme};
//! use kilo_bloom::storage::LockedBitSet;
//!
//! let params = estimate(10_000, 0.01).unwrap();
//! let bits = Arc::new(LockedBitSet::new(params.bits));
//!
//! let filter = BloomFilter::with_parameters(params, Arc::clone(&bits))
//!     .unwrap()
//!     .with_scheme(IndexScheme::DoubleHashing);
//!
//! filter.add("hello").unwrap();
//! assert!(filter.exists("hello").unwrap());
//! assert!(!filter.exists("world").unwrap());
//!
//! // The caller owns the array and persists it together with `params`.
//! let words = bits.to_words();
//! assert_eq!(words.len() as u64, params.bits.div_ceil(64));
//! ```
//!
//! # Deduplication pre-check
//!
//! The usual pattern is to consult the filter before an expensive lookup
//! and only pay for the lookup when the filter says "maybe":
//!
//! ```
//! use std::collections::HashSet;
//! use kilo_bloom::bloom::{estimate, BloomFilter};
//! use kilo_bloom::storage::AtomicBitSet;
//!
//! let bits = AtomicBitSet::new(estimate(1_000, 0.01).unwrap().bits);
//! let seen = BloomFilter::new(1_000, 0.01, &bits).unwrap();
//! let mut database = HashSet::new();
//! let mut lookups = 0;
//!
//! for key in ["a", "b", "a", "c"] {
//!     if seen.exists(key).unwrap() {
//!         lookups += 1;
//!         if database.contains(key) {
//!             continue;
//!         }
//!     }
//!     seen.add(key).unwrap();
//!     database.insert(key);
//! }
//!
//! assert_eq!(database.len(), 3);
//! assert!(lookups >= 1);
//! ```

mod filter;
mod hash;
mod params;

pub use filter::BloomFilter;
pub use hash::{ChainedHasher, DoubleHasher, Fnv1Hasher, IndexScheme, MultiHasher};
pub use params::{estimate, expected_false_positive_rate, BloomParameters};
