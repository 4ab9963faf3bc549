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

//! Cardinality estimator over HyperLogLog registers.
//!
//! The estimate is a pure function of the register array:
//!
//! 1. Raw estimate `alpha(m) * m^2 / sum(2^-register)`, the bias-corrected
//!    harmonic mean.
//! 2. If the raw estimate is at most `2.5 * m` and some registers are still
//!    zero, linear counting `m * ln(m / zeros)` is used instead.

/// Bias-correction constant for `m` registers.
pub(super) fn alpha(m: u32) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / f64::from(m)),
    }
}

/// Raw harmonic-mean estimate.
///
/// An all-zero register array sums to `m`, so this is `alpha(m) * m` rather
/// than a division by zero.
pub(super) fn raw_estimate(registers: &[u8]) -> f64 {
    let m = registers.len() as f64;
    let sum: f64 = registers.iter().map(|&value| inv_pow2(value)).sum();
    alpha(registers.len() as u32) * m * m / sum
}

/// Linear counting estimate from the number of empty registers.
///
/// Only meaningful for `zeros > 0`.
pub(super) fn linear_counting(m: u32, zeros: u32) -> f64 {
    debug_assert!(zeros > 0);
    let m = f64::from(m);
    m * (m / f64::from(zeros)).ln()
}

/// Full estimate with small-range correction. Always finite and non-negative.
pub(super) fn estimate(registers: &[u8], zeros: u32) -> f64 {
    let m = registers.len() as u32;
    let raw = raw_estimate(registers);
    if raw <= 2.5 * f64::from(m) && zeros != 0 {
        linear_counting(m, zeros)
    } else {
        raw
    }
}

/// Compute 1 / 2^value (inverse power of 2)
#[inline]
fn inv_pow2(value: u8) -> f64 {
    f64::exp2(-f64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha() {
        assert_eq!(alpha(16), 0.673);
        assert_eq!(alpha(32), 0.697);
        assert_eq!(alpha(64), 0.709);
        let a = alpha(4096);
        assert!((a - 0.7213 / (1.0 + 1.079 / 4096.0)).abs() < 1e-15);
        assert!(a > 0.72 && a < 0.7213);
    }

    #[test]
    fn test_inv_pow2() {
        assert_eq!(inv_pow2(0), 1.0);
        assert_eq!(inv_pow2(1), 0.5);
        assert_eq!(inv_pow2(32), 1.0 / 4_294_967_296.0);
    }

    #[test]
    fn test_empty_registers() {
        let registers = vec![0u8; 64];
        assert!((raw_estimate(&registers) - 0.709 * 64.0).abs() < 1e-9);
        // linear counting takes over: 64 * ln(64 / 64) = 0
        assert_eq!(estimate(&registers, 64), 0.0);
    }

    #[test]
    fn test_linear_counting_branch() {
        let mut registers = vec![0u8; 16];
        registers[0] = 1;
        registers[1] = 3;
        let expected = 16.0 * (16.0f64 / 14.0).ln();
        assert!((estimate(&registers, 14) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_no_empty_registers_keeps_raw() {
        // every register hit once: raw = 0.673 * 256 / 8 = 21.536 <= 40, but no zeros
        let registers = vec![1u8; 16];
        let raw = raw_estimate(&registers);
        assert!((raw - 21.536).abs() < 1e-9);
        assert_eq!(estimate(&registers, 0), raw);
    }

    #[test]
    fn test_large_range_uses_raw() {
        let registers = vec![10u8; 64];
        let raw = raw_estimate(&registers);
        assert!(raw > 2.5 * 64.0);
        assert_eq!(estimate(&registers, 0), raw);
        // 0.709 * 64 * 64 / (64 / 1024)
        assert!((raw - 0.709 * 64.0 * 1024.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_rank_registers_are_finite() {
        let registers = vec![32u8; 1024];
        let value = estimate(&registers, 0);
        assert!(value.is_finite());
        assert!(value > 0.0);
    }
}
