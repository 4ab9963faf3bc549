// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::near;
use streamsketch::bloom::BloomFilter;
use streamsketch::bloom::BloomFilterBuilder;
use streamsketch::error::ErrorKind;
use streamsketch::observe::Event;

#[test]
fn test_small_filter_scenario() {
    let mut filter = BloomFilter::new(50, 3).unwrap();
    for i in 0..5 {
        filter.insert(format!("element-{i}"));
    }

    assert_eq!(filter.bits_used(), 14);
    assert!(filter.contains("element-2"));
    assert!(!filter.contains("missing-item"));
    assert!(!filter.contains("element-5"));
}

#[test]
fn test_small_filter_bit_positions() {
    let mut filter = BloomFilter::new(50, 3).unwrap();
    let mut bits = Vec::new();
    filter.insert_observed("element-2", &mut |event: Event| {
        if let Event::BloomBitSet { bit_index, .. } = event {
            bits.push(bit_index);
        }
    });
    assert_eq!(bits, vec![7, 26, 11]);
}

#[test]
fn test_no_false_negatives() {
    for (num_bits, num_hashes) in [(1, 1), (50, 3), (1000, 7), (4096, 1), (100_000, 12)] {
        let mut filter = BloomFilter::new(num_bits, num_hashes).unwrap();
        let items: Vec<String> = (0..2_000).map(|i| format!("element-{i}")).collect();
        for item in &items {
            filter.insert(item);
        }
        for item in &items {
            assert!(
                filter.contains(item),
                "false negative for {item} with m={num_bits}, k={num_hashes}"
            );
        }
    }
}

#[test]
fn test_false_positive_rate_tracks_theory() {
    let n = 10_000u64;
    let mut filter = BloomFilter::new(10 * n, 5).unwrap();
    for i in 0..n {
        filter.insert(format!("element-{i}"));
    }

    let false_positives = (0..n)
        .filter(|i| filter.contains(format!("missing-{i}")))
        .count();
    let measured = false_positives as f64 / n as f64;
    let theoretical = BloomFilter::theoretical_fpp(10 * n, 5, n);

    assert!(
        measured < theoretical * 3.0 && measured > theoretical / 3.0,
        "measured {measured}, theoretical {theoretical}"
    );
    assert_that!(filter.estimated_fpp(), near(theoretical, theoretical * 0.5));
}

#[test]
fn test_load_factor_near_half_at_design_point() {
    let mut filter = BloomFilterBuilder::with_accuracy(5_000, 0.01)
        .build()
        .unwrap();
    for i in 0..5_000 {
        filter.insert(format!("user-{i}"));
    }
    let load = filter.load_factor();
    assert!(load > 0.45 && load < 0.55, "load {load}");
}

#[test]
fn test_union_equals_combined_inserts() {
    let mut left = BloomFilter::new(4096, 4).unwrap();
    let mut right = BloomFilter::new(4096, 4).unwrap();
    let mut both = BloomFilter::new(4096, 4).unwrap();
    for i in 0..100 {
        let item = format!("item-{i}");
        if i % 2 == 0 {
            left.insert(&item);
        } else {
            right.insert(&item);
        }
        both.insert(&item);
    }

    assert!(left.is_compatible(&right));
    left.union(&right);
    assert_eq!(left, both);
}

#[test]
fn test_invalid_config_message() {
    let err = BloomFilter::new(0, 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_that!(err.message(), contains_substring("num_bits"));

    let err = BloomFilterBuilder::with_accuracy(100, 1.5)
        .build()
        .unwrap_err();
    assert_that!(err.message(), contains_substring("fpp"));
}
