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

//! Bloom filter for approximate set membership.
//!
//! The filter is a fixed-length bit array packed into 64-bit words. Each item is
//! hashed once; `k` bit positions are derived from the two halves of the digest
//! by enhanced double hashing (see [`crate::hash`]). Bits are only ever set,
//! never cleared, which is what rules out false negatives.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::new(10_000, 5).unwrap();
//! filter.insert("apple");
//! filter.insert(b"raw bytes");
//!
//! assert!(filter.contains("apple"));
//! assert!(!filter.contains("grape")); // false positives are possible, but rare here
//! ```
//!
//! # Sizing by accuracy
//!
//! ```rust
//! use streamsketch::bloom::BloomFilterBuilder;
//!
//! let filter = BloomFilterBuilder::with_accuracy(1_000, 0.01).build().unwrap();
//! assert_eq!(filter.num_hashes(), 7);
//! ```

mod sketch;

pub use self::sketch::BloomFilter;
pub use self::sketch::BloomFilterBuilder;
