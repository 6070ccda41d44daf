//! Test modules for Kilo Bloom.
//!
//! Unit tests live next to the code they exercise. This module holds the
//! cross-module property-based tests and the strategies and fixtures they
//! share.
