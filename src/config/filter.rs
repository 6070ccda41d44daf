//! Filter configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::bloom::{estimate, BloomParameters, IndexScheme};
use crate::error::config::ConfigError;
use crate::error::BloomResult;

/// Configuration for sizing a Bloom filter.
///
/// The expected item count and false positive rate feed the parameter
/// estimator; the index scheme decides how items map to bits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Expected number of items that will be inserted into the filter
    pub expected_items: u64,

    /// Desired probability of false positives once `expected_items` were inserted
    pub false_positive_rate: f64,

    /// How items are mapped to bit positions
    pub index_scheme: IndexScheme,
}

impl FilterConfig {
    /// Create a new default configuration.
    ///
    /// Default values:
    /// - expected_items: 100,000
    /// - false_positive_rate: 0.01 (1%)
    /// - index_scheme: double hashing
    pub fn new() -> Self {
        Self {
            expected_items: 100_000,
            false_positive_rate: 0.01,
            index_scheme: IndexScheme::DoubleHashing,
        }
    }

    /// Set the expected number of items to be inserted into the filter.
    pub fn with_expected_items(mut self, expected_items: u64) -> Self {
        self.expected_items = expected_items;
        self
    }

    /// Set the desired false positive rate (between 0.0 and 1.0 exclusive).
    ///
    /// Lower values increase accuracy but require more memory.
    pub fn with_false_positive_rate(mut self, false_positive_rate: f64) -> Self {
        self.false_positive_rate = false_positive_rate;
        self
    }

    /// Set the scheme mapping items to bit positions.
    pub fn with_index_scheme(mut self, index_scheme: IndexScheme) -> Self {
        self.index_scheme = index_scheme;
        self
    }

    /// Estimate the bit count and hash rounds for this configuration.
    pub fn parameters(&self) -> BloomResult<BloomParameters> {
        estimate(self.expected_items, self.false_positive_rate)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.expected_items == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "filter.expected_items".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "filter.false_positive_rate".to_string(),
                message: format!(
                    "must be between 0.0 and 1.0 exclusive, got {}",
                    self.false_positive_rate
                ),
            });
        }

        Ok(())
    }
}
