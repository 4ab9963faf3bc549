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

use std::collections::HashSet;

use googletest::assert_that;
use googletest::prelude::contains_substring;
use streamsketch::common::XorShift64;
use streamsketch::reservoir::ReservoirSampler;

/// Pearson's chi-square statistic of `counts` against a uniform expectation.
fn chi_square(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&observed| (observed as f64 - expected).powi(2) / expected)
        .sum()
}

/// Runs `runs` independent reservoirs of size `k` over `0..n`, counting how
/// often each item ends up in the sample.
fn selection_counts(n: usize, k: usize, runs: usize, seed: u64) -> Vec<u64> {
    let mut rng = XorShift64::seeded(seed);
    let mut counts = vec![0u64; n];
    for _ in 0..runs {
        let mut reservoir = ReservoirSampler::with_random(k, &mut rng).unwrap();
        for item in 0..n {
            reservoir.update(item);
        }
        for &item in reservoir.sample() {
            counts[item] += 1;
        }
    }
    counts
}

#[test]
fn test_seeded_scenario() {
    let mut reservoir = ReservoirSampler::with_random(5, XorShift64::seeded(42)).unwrap();
    for i in 1..=10 {
        reservoir.update(i);
    }

    let sample = reservoir.sample();
    assert_eq!(sample.len(), 5);
    assert!(sample.iter().all(|v| (1..=10).contains(v)));
    let distinct: HashSet<_> = sample.iter().collect();
    assert_eq!(distinct.len(), 5);
    assert_eq!(sample, &[6, 9, 3, 10, 8]);
}

#[test]
fn test_size_bound_at_every_step() {
    let k = 7;
    let mut reservoir = ReservoirSampler::with_random(k, XorShift64::seeded(3)).unwrap();
    assert_eq!(reservoir.len(), 0);
    for i in 0..100u64 {
        reservoir.update(i);
        assert_eq!(reservoir.num_seen(), i + 1);
        assert_eq!(reservoir.len(), k.min(i as usize + 1));
    }
}

#[test]
fn test_short_stream_keeps_everything() {
    let mut reservoir = ReservoirSampler::new(10).unwrap();
    for word in ["a", "b", "c"] {
        reservoir.update(word.to_string());
    }
    assert_eq!(reservoir.into_sample(), vec!["a", "b", "c"]);
}

#[test]
fn test_uniform_selection_small() {
    // 20 items, k = 5: each item expected in the sample 500 times out of 2000
    let counts = selection_counts(20, 5, 2_000, 2024);
    assert_eq!(counts.iter().sum::<u64>(), 10_000);

    // chi-square critical value for 19 degrees of freedom at p = 0.001
    let statistic = chi_square(&counts);
    assert!(statistic < 43.82, "chi-square {statistic}, counts {counts:?}");
}

#[test]
fn test_uniform_selection_large() {
    // 100 items, k = 10: retention probability k / n = 0.1
    let runs = 5_000;
    let counts = selection_counts(100, 10, runs, 7);

    // chi-square critical value for 99 degrees of freedom at p = 0.001
    let statistic = chi_square(&counts);
    assert!(statistic < 148.23, "chi-square {statistic}");

    for (item, &count) in counts.iter().enumerate() {
        let frequency = count as f64 / runs as f64;
        assert!(
            (frequency - 0.1).abs() < 0.03,
            "item {item} retained with frequency {frequency}"
        );
    }
}

#[test]
fn test_late_items_are_not_favored() {
    let counts = selection_counts(50, 5, 4_000, 11);
    let first_half: u64 = counts[..25].iter().sum();
    let second_half: u64 = counts[25..].iter().sum();
    let ratio = first_half as f64 / second_half as f64;
    assert!(ratio > 0.9 && ratio < 1.1, "ratio {ratio}");
}

#[test]
fn test_invalid_capacity_message() {
    let err = ReservoirSampler::<u64>::new(0).unwrap_err();
    assert_that!(err.message(), contains_substring("capacity"));
}
