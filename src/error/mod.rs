//! Error module for Kilo Bloom.
//!
//! Errors are split by where they originate: parameter validation in the
//! filter itself, failures surfaced by a bit-storage collaborator, and
//! configuration loading. Storage failures are never retried or rewritten
//! by the filter; they reach the caller exactly as the backend produced them.

use thiserror::Error;

pub mod config;

pub use self::config::ConfigError;

/// Result type alias used throughout Kilo Bloom.
pub type BloomResult<T> = Result<T, BloomError>;

/// Failures reported by a [`BitStorage`](crate::storage::BitStorage) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A bit position beyond the capacity of the backing array was addressed.
    ///
    /// Usually means the filter was built with a larger `m` than the storage holds.
    #[error("Bit position {position} is out of range for storage of {capacity} bits")]
    OutOfRange {
        /// The offending position
        position: u64,
        /// Number of bits the storage holds
        capacity: u64,
    },

    /// The backend could not be reached or could not complete the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend specific failure.
    #[error("Storage error: {0}")]
    Other(String),
}

/// Core error enum for Kilo Bloom.
#[derive(Error, Debug)]
pub enum BloomError {
    /// The expected item count was zero.
    #[error("Expected item count must be greater than 0")]
    InvalidExpectedItems,

    /// The false positive rate was not strictly between 0 and 1.
    #[error("False positive rate must be between 0.0 and 1.0 exclusive, got {0}")]
    InvalidFalsePositiveRate(f64),

    /// Explicit or derived filter parameters are unusable.
    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    /// Failure surfaced by the bit-storage collaborator.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Errors occurring during configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BloomError {
    /// Returns the storage failure wrapped by this error, if any.
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self {
            BloomError::Storage(err) => Some(err),
            _ => None,
        }
    }
}
