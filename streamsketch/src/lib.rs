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

//! # streamsketch
//!
//! Approximate streaming data structures that trade exactness for bounded
//! memory and constant-time updates:
//!
//! - [`bloom::BloomFilter`] for approximate set membership.
//! - [`countmin::CountMinSketch`] for approximate frequency estimation.
//! - [`hll::HyperLogLog`] for approximate distinct counting.
//! - [`reservoir::ReservoirSampler`] for uniform sampling from an unbounded stream.
//!
//! All structures allocate their storage once at construction and never resize.
//! None of them synchronizes internally; callers that need concurrent updates
//! should partition the stream across instances and merge the results.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::bloom::BloomFilter;
//! use streamsketch::hll::HyperLogLog;
//!
//! let mut filter = BloomFilter::new(1024, 5).unwrap();
//! filter.insert("apple");
//! assert!(filter.contains("apple"));
//!
//! let mut hll = HyperLogLog::new(1024).unwrap();
//! for i in 0..1000 {
//!     hll.update(format!("user-{i}"));
//! }
//! assert!((hll.estimate() - 1000.0).abs() < 150.0);
//! ```

pub mod bloom;
pub mod common;
pub mod countmin;
pub mod error;
pub mod hash;
pub mod hll;
pub mod observe;
pub mod reservoir;
