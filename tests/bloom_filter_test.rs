// Copyright (c) 2025 Kilo Bloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integration tests for the Bloom filter against its storage contract.

use std::sync::{Arc, Barrier};
use std::thread;

use kilo_bloom::bloom::{estimate, BloomFilter, IndexScheme};
use kilo_bloom::error::{BloomError, StorageError};
use kilo_bloom::storage::{AtomicBitSet, BitStorage, LockedBitSet};
use mockall::mock;
use proptest::prelude::Rng;
use proptest::test_runner::{RngAlgorithm, TestRng};
use test_case::test_case;

mock! {
    pub Storage {}

    impl BitStorage for Storage {
        fn set(&self, positions: &[u64]) -> Result<(), StorageError>;
        fn test(&self, positions: &[u64]) -> Result<bool, StorageError>;
    }
}

/// `count` random 8-byte items from a fixed seed.
fn random_items(rng: &mut TestRng, count: usize) -> Vec<[u8; 8]> {
    (0..count).map(|_| rng.next_u64().to_le_bytes()).collect()
}

#[test_case(IndexScheme::DoubleHashing ; "double hashing")]
#[test_case(IndexScheme::ChainedFnv1a ; "chained fnv1a")]
#[test_case(IndexScheme::ChainedFnv1 ; "chained fnv1")]
fn test_apple_banana_scenario(scheme: IndexScheme) {
    let params = estimate(100, 0.05).unwrap();
    let bits = AtomicBitSet::new(params.bits);
    let filter = BloomFilter::new(100, 0.05, &bits).unwrap().with_scheme(scheme);

    assert!(!filter.exists("banana").unwrap());

    filter.add("apple").unwrap();

    assert!(filter.exists("apple").unwrap());
    assert!(!filter.exists("banana").unwrap());
}

#[test]
fn test_estimate_sanity() {
    let params = estimate(1_000, 0.01).unwrap();
    assert!(params.bits > 0);
    assert!(params.hashes > 0);

    // Same order of magnitude as n * ln(1/p).
    let scale = 1_000.0 * (1.0f64 / 0.01).ln();
    let ratio = params.bits as f64 / scale;
    assert!(ratio > 1.0 && ratio < 10.0, "ratio was {ratio}");
}

#[test_case(IndexScheme::DoubleHashing ; "double hashing")]
#[test_case(IndexScheme::ChainedFnv1a ; "chained fnv1a")]
#[test_case(IndexScheme::ChainedFnv1 ; "chained fnv1")]
fn test_false_positive_rate(scheme: IndexScheme) {
    let expected_items = 10_000;
    let target_rate = 0.01;

    let params = estimate(expected_items as u64, target_rate).unwrap();
    let bits = AtomicBitSet::new(params.bits);
    let filter = BloomFilter::with_parameters(params, &bits)
        .unwrap()
        .with_scheme(scheme);

    let mut rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    let inserted = random_items(&mut rng, expected_items);
    let probes = random_items(&mut rng, expected_items);

    for item in &inserted {
        filter.add(item).unwrap();
    }
    for item in &inserted {
        assert!(filter.exists(item).unwrap(), "false negative under {scheme}");
    }

    let false_positives = probes
        .iter()
        .filter(|item| filter.exists(item).unwrap())
        .count();
    let actual_rate = false_positives as f64 / expected_items as f64;

    // Allow for statistical variation around the target.
    assert!(
        actual_rate < target_rate * 3.0,
        "{scheme}: false positive rate {actual_rate} against target {target_rate}"
    );
}

#[test]
fn test_sequential_keys_false_positive_rate() {
    let params = estimate(10_000, 0.01).unwrap();
    let bits = LockedBitSet::new(params.bits);
    let filter = BloomFilter::with_parameters(params, &bits).unwrap();

    for i in 1_000_000..1_010_000u64 {
        filter.add(i.to_string()).unwrap();
    }

    let false_positives = (2_000_000..2_010_000u64)
        .filter(|i| filter.exists(i.to_string()).unwrap())
        .count();

    assert!(
        false_positives < 300,
        "false positive count too high: {false_positives}"
    );
}

#[test]
fn test_test_error_propagates_from_exists() {
    let mut storage = MockStorage::new();
    storage.expect_set().never();
    storage.expect_test().times(1).returning(|positions| {
        assert_eq!(positions.len(), 4);
        Err(StorageError::Unavailable("replica lagging".to_string()))
    });

    let filter = BloomFilter::new(100, 0.05, storage).unwrap();
    let result = filter.exists("apple");

    match result {
        Err(BloomError::Storage(err)) => {
            assert_eq!(err, StorageError::Unavailable("replica lagging".to_string()))
        }
        other => panic!("expected storage error, got {other:?}"),
    }
}

#[test]
fn test_set_error_propagates_from_add() {
    let mut storage = MockStorage::new();
    storage
        .expect_set()
        .times(1)
        .returning(|_| Err(StorageError::Other("quota exceeded".to_string())));

    let filter = BloomFilter::new(100, 0.05, storage).unwrap();
    let err = filter.add("apple").unwrap_err();

    assert_eq!(err.to_string(), "Storage error: quota exceeded");
    assert_eq!(
        err.as_storage(),
        Some(&StorageError::Other("quota exceeded".to_string()))
    );
}

#[test]
fn test_each_operation_makes_one_storage_call() {
    let params = estimate(100, 0.05).unwrap();
    let expected = BloomFilter::with_parameters(params, AtomicBitSet::new(params.bits))
        .unwrap()
        .locations("apple");

    let mut storage = MockStorage::new();
    let for_set = expected.clone();
    storage
        .expect_set()
        .times(1)
        .returning(move |positions| {
            assert_eq!(positions, for_set.as_slice());
            Ok(())
        });
    storage
        .expect_test()
        .times(1)
        .returning(move |positions| {
            assert_eq!(positions, expected.as_slice());
            Ok(true)
        });

    let filter = BloomFilter::with_parameters(params, storage).unwrap();
    filter.add("apple").unwrap();
    assert!(filter.exists("apple").unwrap());
}

#[test]
fn test_concurrency() {
    let params = estimate(8_000, 0.01).unwrap();
    let bits = Arc::new(AtomicBitSet::new(params.bits));
    let filter = Arc::new(BloomFilter::with_parameters(params, Arc::clone(&bits)).unwrap());

    let thread_count = 8;
    let items_per_thread = 1_000;
    let barrier = Arc::new(Barrier::new(thread_count + 1));
    let mut handles = Vec::with_capacity(thread_count);

    for t in 0..thread_count {
        let filter = Arc::clone(&filter);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            let start = (t * items_per_thread) as u64;
            let end = start + items_per_thread as u64;

            // Wait for all threads to be ready
            barrier.wait();
            for i in start..end {
                filter.add(i.to_le_bytes()).unwrap();
            }

            // Wait for all threads to finish inserting
            barrier.wait();
            for i in 0..(thread_count * items_per_thread) as u64 {
                assert!(filter.exists(i.to_le_bytes()).unwrap());
            }
        }));
    }

    barrier.wait();
    barrier.wait();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(bits.count_ones() > 0);
}

#[test]
fn test_restore_from_persisted_words() {
    let params = estimate(1_000, 0.01).unwrap();
    let original = LockedBitSet::new(params.bits);
    let filter = BloomFilter::with_parameters(params, &original)
        .unwrap()
        .with_scheme(IndexScheme::ChainedFnv1);

    for i in 0..100u32 {
        filter.add(format!("user:{i}")).unwrap();
    }

    // The caller persists the words together with m, k and the scheme.
    let saved_params = filter.parameters();
    let saved_scheme = filter.scheme();
    let saved_words = original.to_words();

    let restored_bits = LockedBitSet::from_words(saved_params.bits, saved_words).unwrap();
    let restored = BloomFilter::with_parameters(saved_params, &restored_bits)
        .unwrap()
        .with_scheme(saved_scheme);

    for i in 0..100u32 {
        assert!(restored.exists(format!("user:{i}")).unwrap());
    }
}
