//! Kilo Bloom Library
//!
//! A Bloom filter answering "has this item possibly been seen before?" with
//! a tunable false positive rate and no false negatives, meant as a cheap
//! pre-check in front of caches, deduplication layers and storage engines.
//!
//! # Architecture
//!
//! - [`bloom`]: parameter estimation, item-to-position mapping and the filter.
//! - [`storage`]: the bit-storage contract the filter delegates to, plus
//!   in-memory reference backends.
//! - [`config`]: file and environment driven filter configuration.
//! - [`error`]: error types shared by all of the above.
//!
//! The filter owns no bits. It computes positions and makes exactly one
//! call into a [`storage::BitStorage`] per operation, so the backend decides
//! about memory layout, persistence and concurrency.

pub mod bloom;
pub mod config;
pub mod error;
pub mod storage;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

pub use bloom::{estimate, BloomFilter, BloomParameters, IndexScheme};
pub use error::{BloomError, BloomResult, StorageError};
pub use storage::BitStorage;

/// Version information for Kilo Bloom.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
