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

//! HyperLogLog sketch for approximate distinct counting.
//!
//! The sketch keeps `m` small registers. Each item's 64-bit digest is split
//! into two 32-bit halves and mixed: one half picks a register, the number of
//! leading zeros of the other (plus one) is the item's rank, and the register
//! keeps the largest rank it has seen. The harmonic mean of `2^register` over
//! all registers yields the cardinality estimate, with linear counting taking
//! over while many registers are still empty.
//!
//! The relative standard error is about `1.04 / sqrt(m)`.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::hll::HyperLogLog;
//!
//! let mut sketch = HyperLogLog::new(1024).unwrap();
//! for i in 0..10_000 {
//!     sketch.update(format!("user-{i}"));
//! }
//! // duplicates leave the registers untouched
//! sketch.update("user-1");
//!
//! let estimate = sketch.estimate();
//! assert!((estimate - 10_000.0).abs() < 10_000.0 * 3.0 * sketch.relative_standard_error());
//! ```

mod estimator;
mod sketch;

pub use self::sketch::HyperLogLog;

/// Largest rank a register can hold.
pub const MAX_RANK: u8 = 32;

/// Splits a 64-bit digest into a register selector and a rank source.
///
/// The high and low halves are cross-mixed with rotations so that bucket and
/// rank are decorrelated even for digests with weak high bits.
#[inline]
fn split_digest(digest: u64) -> (u32, u32) {
    let mut w = (digest >> 32) as u32;
    let mut z = digest as u32;
    w ^= z.rotate_left(13);
    z ^= w.rotate_left(7);
    (w, z)
}

/// Rank of a rank-source word: leading zeros plus one, capped at [`MAX_RANK`].
#[inline]
fn rank(z: u32) -> u8 {
    (z.leading_zeros() + 1).min(u32::from(MAX_RANK)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank() {
        assert_eq!(rank(u32::MAX), 1);
        assert_eq!(rank(1 << 31), 1);
        assert_eq!(rank(1 << 30), 2);
        assert_eq!(rank(1), 32);
        assert_eq!(rank(0), MAX_RANK);
    }

    #[test]
    fn test_split_digest_mixes_halves() {
        // with a zero low half the high half passes through unchanged
        assert_eq!(split_digest(0xdead_beef_0000_0000).0, 0xdead_beef);
        // with a zero high half the low half leaks into the selector
        let (w, _) = split_digest(0x0000_0000_0000_0001);
        assert_eq!(w, 1 << 13);
        assert_eq!(split_digest(0), (0, 0));
    }
}
