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

//! Injectable random sources for randomized sketches.
//!
//! Randomized structures take their generator as a value instead of reaching
//! for process-wide state, so a seeded source makes every run reproducible.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

const GOLDEN_GAMMA: u64 = 0x9e3779b97f4a7c15;

/// Random number source for sketches.
pub trait RandomSource {
    /// Returns the next random 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Returns a uniformly distributed value in `[0, bound)`.
    ///
    /// Uses Lemire's multiply-and-reject method, so the result carries no
    /// modulo bias for any bound.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::common::{RandomSource, XorShift64};
    ///
    /// let mut rng = XorShift64::seeded(7);
    /// for _ in 0..100 {
    ///     assert!(rng.next_bounded(10) < 10);
    /// }
    /// ```
    fn next_bounded(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "bound must be positive");
        // 2^64 mod bound: low products below this fall in the biased zone
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let product = u128::from(self.next_u64()) * u128::from(bound);
            if (product as u64) >= threshold {
                return (product >> 64) as u64;
            }
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }
}

/// Xorshift-based random generator for sketch operations.
#[derive(Debug, Clone, Copy)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a new generator using the provided seed.
    ///
    /// A zero seed would lock the generator at zero, so it is replaced with a
    /// fixed non-zero constant.
    pub fn seeded(seed: u64) -> Self {
        let state = if seed == 0 { GOLDEN_GAMMA } else { seed };
        Self { state }
    }
}

impl Default for XorShift64 {
    fn default() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seed = nanos as u64 ^ u64::from(std::process::id());
        Self::seeded(seed)
    }
}

impl RandomSource for XorShift64 {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of raw values.
    struct Scripted(Vec<u64>);

    impl RandomSource for Scripted {
        fn next_u64(&mut self) -> u64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = XorShift64::seeded(42);
        let mut b = XorShift64::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        let mut rng = XorShift64::seeded(0);
        assert_ne!(rng.next_u64(), 0);
        assert_eq!(
            XorShift64::seeded(0).next_u64(),
            XorShift64::seeded(GOLDEN_GAMMA).next_u64()
        );
    }

    #[test]
    fn test_first_value() {
        let mut rng = XorShift64::seeded(1);
        assert_eq!(rng.next_u64(), 0x4082_2041);
    }

    #[test]
    fn test_bounded_maps_high_bits() {
        // the high 64 bits of value * bound become the draw
        let mut rng = Scripted(vec![1, u64::MAX, (1 << 63) + 1]);
        assert_eq!(rng.next_bounded(10), 0);
        assert_eq!(rng.next_bounded(10), 9);
        assert_eq!(rng.next_bounded(10), 5);
    }

    #[test]
    fn test_bounded_rejects_biased_zone() {
        // bound 3: threshold = 2^64 mod 3 = 1, so a product with low word 0 is rejected
        let mut rng = Scripted(vec![0, 1 << 62]);
        assert_eq!(rng.next_bounded(3), 0);
        assert!(rng.0.is_empty());
    }

    #[test]
    fn test_bounded_one_is_always_zero() {
        let mut rng = XorShift64::seeded(3);
        for _ in 0..100 {
            assert_eq!(rng.next_bounded(1), 0);
        }
    }

    #[test]
    fn test_bounded_is_roughly_uniform() {
        let mut rng = XorShift64::seeded(12345);
        let mut counts = [0u32; 6];
        for _ in 0..60_000 {
            counts[rng.next_bounded(6) as usize] += 1;
        }
        for count in counts {
            assert!((9_000..11_000).contains(&count), "count {count}");
        }
    }

    #[test]
    #[should_panic(expected = "bound must be positive")]
    fn test_bounded_zero_panics() {
        XorShift64::seeded(1).next_bounded(0);
    }

    #[test]
    fn test_mut_ref_is_a_source() {
        let mut rng = XorShift64::seeded(9);
        let expected = XorShift64::seeded(9).next_u64();
        let by_ref = &mut rng;
        fn draw(mut source: impl RandomSource) -> u64 {
            source.next_u64()
        }
        assert_eq!(draw(by_ref), expected);
    }
}
