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

//! Reservoir sampling over streams of unknown length.
//!
//! [`ReservoirSampler`] implements Algorithm R: it keeps the first `k` items,
//! then replaces a uniformly chosen slot with the `n`-th item with probability
//! `k / n`. At any point the buffer is a uniform random sample of size
//! `min(k, n)` of everything seen so far.
//!
//! The random source is injected, so a seeded generator makes sampling
//! reproducible.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::common::XorShift64;
//! use streamsketch::reservoir::ReservoirSampler;
//!
//! let mut reservoir = ReservoirSampler::with_random(10, XorShift64::seeded(42)).unwrap();
//! for value in 0_u64..1_000 {
//!     reservoir.update(value);
//! }
//!
//! assert_eq!(reservoir.num_seen(), 1_000);
//! assert_eq!(reservoir.sample().len(), 10);
//! ```

mod sketch;

pub use self::sketch::ReservoirSampler;
