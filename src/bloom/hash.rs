// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Hashing utilities mapping an item to its bit positions.
//!
//! Every scheme is a pure function of the item bytes, `k` and `m`, so the
//! positions of an item are stable across calls and across process runs.
//! Two families are provided:
//!
//! - Double hashing: two independent 64-bit FNV digests combined as
//!   `h1 + i * h2 (mod m)`. This is the default.
//! - Chained hashing: one streaming FNV hasher fed the item, then one extra
//!   byte per round, reading the digest after each byte. Rounds are not
//!   independent, but the bit layout matches existing filters built this way.

use std::fmt;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::str::FromStr;

use fnv::FnvHasher;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// FNV-1 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A trait for computing multiple bit positions from a single input.
pub trait MultiHasher {
    /// Compute `hash_count` positions for `item`, each in `[0, bit_count)`.
    ///
    /// Round `i` of the output always maps to the same position for the
    /// same item; the output is not sorted and may contain duplicates.
    fn compute_locations(&self, item: &[u8], hash_count: u32, bit_count: u64) -> Vec<u64>;
}

/// Streaming FNV-1 (multiply, then xor) 64-bit hasher.
///
/// The [`fnv`] crate only ships the FNV-1a variant.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1Hasher(u64);

impl Default for Fnv1Hasher {
    fn default() -> Self {
        Self(FNV_OFFSET_BASIS)
    }
}

impl Hasher for Fnv1Hasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.wrapping_mul(FNV_PRIME) ^ u64::from(byte);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Double hashing over FNV-1a and FNV-1 digests of the item.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleHasher;

impl MultiHasher for DoubleHasher {
    fn compute_locations(&self, item: &[u8], hash_count: u32, bit_count: u64) -> Vec<u64> {
        let mut first = FnvHasher::default();
        first.write(item);
        let h1 = first.finish();

        // Odd stride, so consecutive rounds never collapse onto one position
        // when the stride is a multiple of a power-of-two `m`.
        let mut second = Fnv1Hasher::default();
        second.write(item);
        let h2 = second.finish() | 1;

        (0..u64::from(hash_count))
            .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % bit_count)
            .collect()
    }
}

/// Chained hashing over one streaming hasher `H`.
///
/// The hasher is fed the item once. For round `i` the single byte `i as u8`
/// is appended to the same running state and the digest, reduced modulo
/// `m`, becomes position `i`. The state is never reset between rounds.
pub struct ChainedHasher<H> {
    _marker: PhantomData<fn() -> H>,
}

impl<H> ChainedHasher<H> {
    /// Create a new chained hasher.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<H> Default for ChainedHasher<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for ChainedHasher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedHasher")
            .field("hasher", &std::any::type_name::<H>())
            .finish()
    }
}

impl<H: Hasher + Default> MultiHasher for ChainedHasher<H> {
    fn compute_locations(&self, item: &[u8], hash_count: u32, bit_count: u64) -> Vec<u64> {
        let mut hasher = H::default();
        hasher.write(item);

        (0..hash_count)
            .map(|round| {
                // Only the low byte of the round index is fed.
                hasher.write(&[round as u8]);
                hasher.finish() % bit_count
            })
            .collect()
    }
}

/// How an item is mapped to its bit positions.
///
/// Changing the scheme of an existing filter changes which bits every item
/// maps to; persist it with the filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexScheme {
    /// `h1 + i * h2 (mod m)` over independent FNV-1a and FNV-1 digests.
    #[default]
    DoubleHashing,
    /// Chained rounds over a streaming FNV-1a hasher.
    ChainedFnv1a,
    /// Chained rounds over a streaming FNV-1 hasher.
    ///
    /// Bit-for-bit compatible with arrays written by filters that use Go's
    /// `hash/fnv.New64` in a chained layout.
    ChainedFnv1,
}

impl IndexScheme {
    /// All schemes, in declaration order.
    pub const ALL: [IndexScheme; 3] = [
        IndexScheme::DoubleHashing,
        IndexScheme::ChainedFnv1a,
        IndexScheme::ChainedFnv1,
    ];

    /// Compute `hash_count` positions in `[0, bit_count)` for `item`.
    ///
    /// `bit_count` must be non-zero.
    pub fn locations(self, item: &[u8], hash_count: u32, bit_count: u64) -> Vec<u64> {
        match self {
            IndexScheme::DoubleHashing => {
                DoubleHasher.compute_locations(item, hash_count, bit_count)
            }
            IndexScheme::ChainedFnv1a => {
                ChainedHasher::<FnvHasher>::new().compute_locations(item, hash_count, bit_count)
            }
            IndexScheme::ChainedFnv1 => {
                ChainedHasher::<Fnv1Hasher>::new().compute_locations(item, hash_count, bit_count)
            }
        }
    }

    /// Name used in configuration files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            IndexScheme::DoubleHashing => "double-hashing",
            IndexScheme::ChainedFnv1a => "chained-fnv1a",
            IndexScheme::ChainedFnv1 => "chained-fnv1",
        }
    }
}

impl fmt::Display for IndexScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndexScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| ConfigError::ValueOutOfRange {
                key: "index_scheme".to_string(),
                message: format!(
                    "unknown scheme {s:?}, expected one of double-hashing, chained-fnv1a, chained-fnv1"
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// FNV-1a of `bytes` computed round by round.
    fn fnv1a(bytes: &[u8]) -> u64 {
        bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }

    #[test]
    fn test_fnv1_known_vectors() {
        let mut hasher = Fnv1Hasher::default();
        assert_eq!(hasher.finish(), 0xcbf29ce484222325);

        hasher.write(b"a");
        assert_eq!(hasher.finish(), 0xaf63bd4c8601b7be);
    }

    #[test]
    fn test_fnv1a_crate_matches_round_definition() {
        let mut hasher = FnvHasher::default();
        hasher.write(b"apple");
        assert_eq!(hasher.finish(), fnv1a(b"apple"));
    }

    #[test]
    fn test_chained_fnv1a_layout() {
        let bits = 1_000_003;
        let locations = IndexScheme::ChainedFnv1a.locations(b"apple", 4, bits);

        // Round i reads the digest of item || 0 || 1 || ... || i.
        let expected: Vec<u64> = (0..4u8)
            .map(|round| {
                let mut stream = b"apple".to_vec();
                stream.extend(0..=round);
                fnv1a(&stream) % bits
            })
            .collect();

        assert_eq!(locations, expected);
    }

    #[test]
    fn test_chained_rounds_use_low_byte() {
        // Round 256 feeds byte 0 again.
        let locations = IndexScheme::ChainedFnv1.locations(b"x", 300, u64::MAX);
        assert_eq!(locations.len(), 300);

        let mut hasher = Fnv1Hasher::default();
        hasher.write(b"x");
        for round in 0..=256u32 {
            hasher.write(&[round as u8]);
        }
        assert_eq!(locations[256], hasher.finish() % u64::MAX);
    }

    #[test]
    fn test_double_hashing_layout() {
        let bits = 10_007;
        let mut second = Fnv1Hasher::default();
        second.write(b"apple");
        let h1 = fnv1a(b"apple");
        let h2 = second.finish() | 1;

        let locations = IndexScheme::DoubleHashing.locations(b"apple", 5, bits);
        for (i, &location) in locations.iter().enumerate() {
            assert_eq!(location, h1.wrapping_add((i as u64).wrapping_mul(h2)) % bits);
        }
    }

    #[test]
    fn test_locations_are_in_range_and_diverse() {
        for scheme in IndexScheme::ALL {
            let locations = scheme.locations(b"test_string", 10, 1024);
            assert_eq!(locations.len(), 10);
            assert!(locations.iter().all(|&location| location < 1024));

            let unique = locations.iter().collect::<HashSet<_>>();
            assert!(unique.len() >= 5, "{scheme} produced {unique:?}");
        }
    }

    #[test]
    fn test_hash_stability() {
        for scheme in IndexScheme::ALL {
            let first_run = scheme.locations(b"stable_hash_test", 7, 4096);
            let second_run = scheme.locations(b"stable_hash_test", 7, 4096);
            assert_eq!(first_run, second_run);
        }
    }

    #[test]
    fn test_different_inputs_produce_different_locations() {
        for scheme in IndexScheme::ALL {
            let first = scheme.locations(b"input1", 5, 1 << 20);
            let second = scheme.locations(b"input2", 5, 1 << 20);
            assert_ne!(first, second);
        }
    }

    #[test]
    fn test_single_bit_filter() {
        for scheme in IndexScheme::ALL {
            assert_eq!(scheme.locations(b"anything", 3, 1), vec![0, 0, 0]);
        }
    }

    #[test]
    fn test_scheme_names_round_trip() {
        for scheme in IndexScheme::ALL {
            assert_eq!(scheme.to_string().parse::<IndexScheme>().unwrap(), scheme);
        }
        assert!("murmur".parse::<IndexScheme>().is_err());
        assert_eq!(IndexScheme::default(), IndexScheme::DoubleHashing);
    }
}
