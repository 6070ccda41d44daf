// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Parameter estimation for the Bloom filter.
//!
//! Given `n` expected items and a target false positive probability `p`:
//!
//! - m = ceil(n * ln(p) / ln(1 / 2^ln2)), the optimal bit count
//! - k = ln(2) * m / n, the optimal number of hash rounds
//!
//! Both values are truncated toward zero when converted to integers.

use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BloomError, BloomResult};

/// The two structural parameters of a Bloom filter.
///
/// Callers that persist a bit array must persist these alongside it; a
/// filter rebuilt with different parameters maps items to different bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BloomParameters {
    /// Total number of bits in the backing array (`m`).
    pub bits: u64,
    /// Number of hash rounds, i.e. bit positions per item (`k`).
    pub hashes: u32,
}

impl BloomParameters {
    /// Build parameters from explicit values, e.g. ones read back from storage.
    pub fn new(bits: u64, hashes: u32) -> BloomResult<Self> {
        if bits == 0 {
            return Err(BloomError::InvalidParameters(
                "bit count must be greater than 0".to_string(),
            ));
        }
        if hashes == 0 {
            return Err(BloomError::InvalidParameters(
                "hash count must be greater than 0".to_string(),
            ));
        }
        Ok(Self { bits, hashes })
    }

    /// Expected false positive rate once `inserted` distinct items are in the filter.
    pub fn false_positive_rate(&self, inserted: u64) -> f64 {
        expected_false_positive_rate(self.bits, self.hashes, inserted)
    }
}

/// Compute the bit count and hash rounds for `expected_items` items at
/// `false_positive_rate`.
///
/// # Errors
///
/// - [`BloomError::InvalidExpectedItems`] when `expected_items` is zero.
/// - [`BloomError::InvalidFalsePositiveRate`] when the rate is not strictly
///   between 0 and 1.
/// - [`BloomError::InvalidParameters`] when the bit count does not fit in a `u64`.
///
/// A truncated `k` of zero, which happens for rates above about one half,
/// is raised to one.
///
/// # Examples
///
/// ```
/// use kilo_bloom::bloom::estimate;
///
/// let params = estimate(1_000, 0.01).unwrap();
/// assert_eq!(params.bits, 9_586);
/// assert_eq!(params.hashes, 6);
/// ```
pub fn estimate(expected_items: u64, false_positive_rate: f64) -> BloomResult<BloomParameters> {
    if expected_items == 0 {
        return Err(BloomError::InvalidExpectedItems);
    }
    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(BloomError::InvalidFalsePositiveRate(false_positive_rate));
    }

    let n = expected_items as f64;
    let m = ((n * false_positive_rate.ln()) / (1.0 / 2f64.powf(LN_2)).ln()).ceil();
    if m >= u64::MAX as f64 {
        return Err(BloomError::InvalidParameters(format!(
            "{expected_items} items at rate {false_positive_rate} need more than u64::MAX bits"
        )));
    }

    let k = LN_2 * m / n;
    let hashes = if k < 1.0 {
        warn!(
            expected_items,
            false_positive_rate, "Optimal hash count truncates to 0, using 1"
        );
        1
    } else {
        k.min(u32::MAX as f64) as u32
    };

    Ok(BloomParameters {
        bits: m as u64,
        hashes,
    })
}

/// False positive probability `(1 - e^(-k*n/m))^k` for `inserted` items.
pub fn expected_false_positive_rate(bits: u64, hashes: u32, inserted: u64) -> f64 {
    if bits == 0 {
        return 1.0;
    }
    let k = hashes as f64;
    let exponent = -k * inserted as f64 / bits as f64;
    (1.0 - exponent.exp()).powf(k)
}
