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

//! Hashing utility shared by the sketches.
//!
//! Every item is hashed once with MurmurHash3 x64_128. The two 64-bit halves of
//! the digest are mixed independently by the finalizer, so they serve as the two
//! base values of enhanced double hashing: `k` index functions are simulated as
//! `h1 + i * h2` without hashing the item `k` times.

/// Default seed used by all sketches unless one is configured explicitly.
pub const DEFAULT_SEED: u32 = 9001;

/// Derives the two base hash values of `item` with [`DEFAULT_SEED`].
///
/// # Examples
///
/// ```
/// use streamsketch::hash::derive;
///
/// let (h1, h2) = derive(b"apple");
/// assert_ne!(h1, h2);
/// assert_eq!(derive(b"apple"), (h1, h2));
/// ```
#[inline]
pub fn derive(item: &[u8]) -> (u64, u64) {
    derive_with_seed(item, DEFAULT_SEED)
}

/// Derives the two base hash values of `item` with an explicit seed.
#[inline]
pub fn derive_with_seed(item: &[u8], seed: u32) -> (u64, u64) {
    mur3::murmurhash3_x64_128(item, seed)
}

/// Computes the `i`-th simulated hash index as `(h1 + i * h2) mod modulus`.
///
/// Arithmetic wraps at 64 bits. For a fixed `(h1, h2, modulus)` the sequence of
/// indices over `i` is deterministic.
///
/// `modulus` must be non-zero; every sketch validates its dimensions at
/// construction so this never fails at update time.
#[inline]
pub fn combine_index(h1: u64, h2: u64, i: u64, modulus: u64) -> u64 {
    debug_assert!(modulus > 0, "modulus must be non-zero");
    h1.wrapping_add(i.wrapping_mul(h2)) % modulus
}
