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

//! Count-Min sketch implementation for frequency estimation.
//!
//! The Count-Min sketch keeps a `depth × width` table of counters. Each row
//! hashes an item under its own seed to pick one column; an update adds
//! the weight to one cell per row and a query takes the minimum over rows.
//! The true count is a lower bound on every one of those cells, so estimates
//! never undercount.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::countmin::CountMinSketch;
//!
//! let mut sketch = CountMinSketch::new(256, 5).unwrap();
//!
//! sketch.update("apple");
//! sketch.update_with_weight("banana", 3);
//!
//! let banana = sketch.estimate("banana");
//! assert!(banana >= 3);
//! assert!(banana <= 3 + sketch.error_bound());
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! use streamsketch::countmin::CountMinSketch;
//!
//! let width = CountMinSketch::suggest_width(0.01).unwrap();
//! let depth = CountMinSketch::suggest_depth(0.99).unwrap();
//!
//! let _sketch = CountMinSketch::new(width, depth).unwrap();
//! ```

mod sketch;
pub use self::sketch::CountMinSketch;
pub use self::sketch::MAX_NUM_CELLS;
