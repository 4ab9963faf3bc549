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

use crate::error::Error;
use crate::hash::DEFAULT_SEED;
use crate::hash::combine_index;
use crate::hash::derive_with_seed;
use crate::observe::Event;
use crate::observe::NoopObserver;
use crate::observe::Observer;

const BITS_PER_WORD: u64 = 64;

const MAX_NUM_BITS: u64 = (1u64 << 35) - 64; // ~4 GiB of words
const MAX_NUM_HASHES: u32 = 100;

// Lower bound applied when sizing by accuracy only.
const MIN_SUGGESTED_BITS: u64 = 64;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - False positive rate near `(1 - e^(-k*n/m))^k`
/// - Constant space usage
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Hash seed for all index functions
    seed: u32,
    /// Number of simulated hash functions (k)
    num_hashes: u32,
    /// Total number of bits in the filter (m)
    capacity_bits: u64,
    /// Count of bits set to 1
    num_bits_set: u64,
    /// Bit array packed into u64 words, length = ceil(capacity_bits / 64)
    bit_array: Box<[u64]>,
}

impl BloomFilter {
    /// Creates an empty filter of `num_bits` bits using `num_hashes` index functions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if either argument is zero or exceeds the supported maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(50, 3).unwrap();
    /// assert_eq!(filter.capacity(), 50);
    /// assert!(BloomFilter::new(0, 3).is_err());
    /// ```
    pub fn new(num_bits: u64, num_hashes: u32) -> Result<Self, Error> {
        Self::with_seed(num_bits, num_hashes, DEFAULT_SEED)
    }

    /// Same as [`BloomFilter::new`] with an explicit hash seed.
    pub fn with_seed(num_bits: u64, num_hashes: u32, seed: u32) -> Result<Self, Error> {
        validate_params(num_bits, num_hashes)?;

        let num_words = num_bits.div_ceil(BITS_PER_WORD) as usize;
        Ok(BloomFilter {
            seed,
            num_hashes,
            capacity_bits: num_bits,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words].into_boxed_slice(),
        })
    }

    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::BloomFilter;
    /// use streamsketch::bloom::BloomFilterBuilder;
    ///
    /// // By accuracy
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
    ///
    /// // By size
    /// let filter = BloomFilter::builder().size(10_000, 7).seed(42).build().unwrap();
    /// assert_eq!(filter.seed(), 42);
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item may be in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    ///
    /// Stops at the first unset bit.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        self.contains_observed(item, &mut NoopObserver)
    }

    /// Same as [`contains`](Self::contains), reporting every probed bit.
    pub fn contains_observed<O: Observer>(&self, item: impl AsRef<[u8]>, observer: &mut O) -> bool {
        let (h1, h2) = derive_with_seed(item.as_ref(), self.seed);
        for i in 0..self.num_hashes {
            let bit_index = self.compute_bit_index(h1, h2, i);
            let is_set = self.get_bit(bit_index);
            observer.observe(Event::BloomBitProbe {
                hash_index: i,
                bit_index,
                is_set,
            });
            if !is_set {
                return false;
            }
        }
        true
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 4).unwrap();
    ///
    /// assert!(!filter.contains_and_insert("apple"));
    /// assert!(filter.contains_and_insert("apple"));
    /// ```
    pub fn contains_and_insert(&mut self, item: impl AsRef<[u8]>) -> bool {
        let (h1, h2) = derive_with_seed(item.as_ref(), self.seed);
        let mut was_present = true;
        for i in 0..self.num_hashes {
            let bit_index = self.compute_bit_index(h1, h2, i);
            was_present &= !self.set_bit(bit_index);
        }
        was_present
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` always returns `true`. Inserting the
    /// same item again leaves the filter unchanged.
    pub fn insert(&mut self, item: impl AsRef<[u8]>) {
        self.insert_observed(item, &mut NoopObserver);
    }

    /// Same as [`insert`](Self::insert), reporting every bit it sets.
    pub fn insert_observed<O: Observer>(&mut self, item: impl AsRef<[u8]>, observer: &mut O) {
        let (h1, h2) = derive_with_seed(item.as_ref(), self.seed);
        for i in 0..self.num_hashes {
            let bit_index = self.compute_bit_index(h1, h2, i);
            let newly_set = self.set_bit(bit_index);
            observer.observe(Event::BloomBitSet {
                hash_index: i,
                bit_index,
                word_index: (bit_index / BITS_PER_WORD) as usize,
                bit_offset: (bit_index % BITS_PER_WORD) as u32,
                newly_set,
            });
        }
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter recognizes items from either filter.
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible (different size, hashes, or seed).
    /// Use [`is_compatible()`](Self::is_compatible) to check first.
    pub fn union(&mut self, other: &BloomFilter) {
        assert!(
            self.is_compatible(other),
            "Cannot union incompatible Bloom filters"
        );

        for (word, other_word) in self.bit_array.iter_mut().zip(other.bit_array.iter()) {
            *word |= *other_word;
        }

        self.recount_bits_set();
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether the filter is empty (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter (capacity).
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the number of bytes held by the bit array.
    pub fn size_bytes(&self) -> usize {
        self.bit_array.len() * std::mem::size_of::<u64>()
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values above 0.5 indicate degraded false positive rates.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability from the load factor.
    ///
    /// A lookup of an absent item succeeds when all `k` probed bits happen to
    /// be set, so the estimate is `load^k`. It needs no insertion count.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(self.num_hashes as i32)
    }

    /// Theoretical false positive probability `(1 - e^(-k*n/m))^k` after
    /// `num_items` distinct insertions.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::bloom::BloomFilter;
    ///
    /// let p = BloomFilter::theoretical_fpp(100_000, 5, 10_000);
    /// assert!((p - 0.00943).abs() < 1e-4);
    /// ```
    pub fn theoretical_fpp(num_bits: u64, num_hashes: u32, num_items: u64) -> f64 {
        let k = f64::from(num_hashes);
        let exponent = -k * num_items as f64 / num_bits as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same:
    /// - Capacity (number of bits)
    /// - Number of hash functions
    /// - Seed
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity_bits == other.capacity_bits
            && self.num_hashes == other.num_hashes
            && self.seed == other.seed
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn compute_bit_index(&self, h1: u64, h2: u64, i: u32) -> u64 {
        combine_index(h1, h2, u64::from(i), self.capacity_bits)
    }

    fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index / BITS_PER_WORD) as usize;
        let mask = 1u64 << (bit_index % BITS_PER_WORD);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a bit, returning whether it was previously unset.
    fn set_bit(&mut self, bit_index: u64) -> bool {
        let word_index = (bit_index / BITS_PER_WORD) as usize;
        let mask = 1u64 << (bit_index % BITS_PER_WORD);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
            true
        } else {
            false
        }
    }

    fn recount_bits_set(&mut self) {
        self.num_bits_set = self
            .bit_array
            .iter()
            .map(|word| u64::from(word.count_ones()))
            .sum();
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Size { num_bits: u64, num_hashes: u32 },
    Accuracy { max_items: u64, fpp: f64 },
}

/// Builder for [`BloomFilter`], sized either explicitly or by target accuracy.
///
/// All validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    sizing: Option<Sizing>,
    seed: u32,
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        BloomFilterBuilder {
            sizing: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl BloomFilterBuilder {
    /// Sizes the filter for `max_items` distinct items at false positive
    /// probability `fpp`.
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        Self::default().accuracy(max_items, fpp)
    }

    /// Sizes the filter explicitly.
    pub fn with_size(num_bits: u64, num_hashes: u32) -> Self {
        Self::default().size(num_bits, num_hashes)
    }

    /// Sets an accuracy target, replacing any previous sizing.
    pub fn accuracy(mut self, max_items: u64, fpp: f64) -> Self {
        self.sizing = Some(Sizing::Accuracy { max_items, fpp });
        self
    }

    /// Sets an explicit size, replacing any previous sizing.
    pub fn size(mut self, num_bits: u64, num_hashes: u32) -> Self {
        self.sizing = Some(Sizing::Size {
            num_bits,
            num_hashes,
        });
        self
    }

    /// Sets the hash seed. Only filters with equal seeds can be merged.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if no sizing was given, if `max_items` is zero, if `fpp` is not in
    /// `(0, 1)`, or if the resulting size is out of range.
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (num_bits, num_hashes) = match self.sizing {
            None => {
                return Err(Error::config_invalid(
                    "Bloom filter needs a size or an accuracy target",
                ));
            }
            Some(Sizing::Size {
                num_bits,
                num_hashes,
            }) => (num_bits, num_hashes),
            Some(Sizing::Accuracy { max_items, fpp }) => {
                if max_items == 0 {
                    return Err(Error::config_invalid("max_items must be greater than 0")
                        .with_context("max_items", max_items));
                }
                if !(fpp > 0.0 && fpp < 1.0) {
                    return Err(Error::config_invalid(
                        "fpp must be between 0.0 and 1.0 (exclusive)",
                    )
                    .with_context("fpp", fpp));
                }
                let num_bits = Self::suggest_num_bits(max_items, fpp);
                let num_hashes = Self::suggest_num_hashes(max_items, num_bits);
                (num_bits, num_hashes)
            }
        };

        BloomFilter::with_seed(num_bits, num_hashes, self.seed)
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests the number of bits for `max_items` items at probability `fpp`.
    ///
    /// Computes `-n * ln(p) / ln(2)^2`, rounded up to a whole number of words.
    ///
    /// # Examples
    ///
    /// ```
    /// # use streamsketch::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_bits(1000, 0.01), 9600);
    /// ```
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;
        let bits = bits.div_ceil(BITS_PER_WORD) * BITS_PER_WORD;

        bits.clamp(MIN_SUGGESTED_BITS, MAX_NUM_BITS)
    }

    /// Suggests the number of hash functions as `m/n * ln(2)`.
    pub fn suggest_num_hashes(max_items: u64, num_bits: u64) -> u32 {
        let m = num_bits as f64;
        let n = max_items.max(1) as f64;

        let k = (m / n * std::f64::consts::LN_2).round();

        (k as u32).clamp(1, MAX_NUM_HASHES)
    }
}

fn validate_params(num_bits: u64, num_hashes: u32) -> Result<(), Error> {
    if num_bits == 0 || num_bits > MAX_NUM_BITS {
        return Err(Error::config_invalid(format!(
            "num_bits must be in [1, {MAX_NUM_BITS}]"
        ))
        .with_context("num_bits", num_bits));
    }
    if num_hashes == 0 || num_hashes > MAX_NUM_HASHES {
        return Err(Error::config_invalid(format!(
            "num_hashes must be in [1, {MAX_NUM_HASHES}]"
        ))
        .with_context("num_hashes", num_hashes));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
