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
use crate::hash::derive_with_seed;
use crate::observe::Event;
use crate::observe::NoopObserver;
use crate::observe::Observer;

/// Upper bound on `width * depth`, 16 GiB of counters.
pub const MAX_NUM_CELLS: usize = 1 << 31;

/// Count-Min sketch for estimating item frequencies.
///
/// The sketch provides upper-biased estimates of item frequencies: an estimate
/// is never below the true count. With probability [`confidence`](Self::confidence)
/// it exceeds the true count by at most [`error_bound`](Self::error_bound).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMinSketch {
    width: usize,
    depth: usize,
    seed: u32,
    total_weight: u64,
    /// Hash seed of each row
    row_seeds: Box<[u32]>,
    /// Row-major `depth × width` counters
    counts: Box<[u64]>,
}

impl CountMinSketch {
    /// Creates an empty sketch with `width` columns and `depth` rows.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if either dimension is zero or the table holds more than
    /// [`MAX_NUM_CELLS`] counters.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::countmin::CountMinSketch;
    ///
    /// let sketch = CountMinSketch::new(10, 3).unwrap();
    /// assert_eq!(sketch.width(), 10);
    /// assert_eq!(sketch.depth(), 3);
    /// assert!(CountMinSketch::new(0, 3).is_err());
    /// ```
    pub fn new(width: usize, depth: usize) -> Result<Self, Error> {
        Self::with_seed(width, depth, DEFAULT_SEED)
    }

    /// Same as [`CountMinSketch::new`] with an explicit hash seed.
    pub fn with_seed(width: usize, depth: usize, seed: u32) -> Result<Self, Error> {
        if width == 0 {
            return Err(Error::config_invalid("width must be positive")
                .with_context("width", width)
                .with_context("depth", depth));
        }
        if depth == 0 {
            return Err(Error::config_invalid("depth must be positive")
                .with_context("width", width)
                .with_context("depth", depth));
        }
        let cells = width.checked_mul(depth).ok_or_else(|| {
            Error::config_invalid("table size overflows")
                .with_context("width", width)
                .with_context("depth", depth)
        })?;
        if cells > MAX_NUM_CELLS {
            return Err(Error::config_invalid("table size exceeds maximum")
                .with_context("width", width)
                .with_context("depth", depth)
                .with_context("max_num_cells", MAX_NUM_CELLS));
        }

        // each row hashes the item independently under its own seed
        let row_seeds = (1..=depth)
            .map(|row| seed.wrapping_add(row as u32))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(CountMinSketch {
            width,
            depth,
            seed,
            total_weight: 0,
            row_seeds,
            counts: vec![0u64; cells].into_boxed_slice(),
        })
    }

    /// Suggests a width whose expected additive error is `relative_error`
    /// times the total weight: `ceil(e / relative_error)`.
    ///
    /// # Errors
    ///
    /// Returns an error unless `relative_error` is in `(0, 1)`.
    pub fn suggest_width(relative_error: f64) -> Result<usize, Error> {
        if !(relative_error > 0.0 && relative_error < 1.0) {
            return Err(Error::config_invalid("relative error must be in (0, 1)")
                .with_context("relative_error", relative_error));
        }
        Ok((std::f64::consts::E / relative_error).ceil() as usize)
    }

    /// Suggests a depth so the error bound holds with probability `confidence`:
    /// `ceil(ln(1 / (1 - confidence)))`.
    ///
    /// # Errors
    ///
    /// Returns an error unless `confidence` is in `(0, 1)`.
    pub fn suggest_depth(confidence: f64) -> Result<usize, Error> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(Error::config_invalid("confidence must be in (0, 1)")
                .with_context("confidence", confidence));
        }
        let depth = (1.0 / (1.0 - confidence)).ln().ceil() as usize;
        Ok(depth.max(1))
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the sum of all weights added so far.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Relative error `e / width` of a single estimate.
    pub fn relative_error(&self) -> f64 {
        std::f64::consts::E / self.width as f64
    }

    /// Probability `1 - e^(-depth)` that an estimate is within
    /// [`error_bound`](Self::error_bound) of the true count.
    pub fn confidence(&self) -> f64 {
        1.0 - (-(self.depth as f64)).exp()
    }

    /// Additive overcount bound `ceil(relative_error * total_weight)`.
    pub fn error_bound(&self) -> u64 {
        (self.relative_error() * self.total_weight as f64).ceil() as u64
    }

    /// Adds one occurrence of `item`.
    pub fn update(&mut self, item: impl AsRef<[u8]>) {
        self.update_with_weight(item, 1);
    }

    /// Adds `count` occurrences of `item`.
    ///
    /// Counters saturate at `u64::MAX` instead of wrapping.
    pub fn update_with_weight(&mut self, item: impl AsRef<[u8]>, count: u64) {
        self.update_observed(item, count, &mut NoopObserver);
    }

    /// Same as [`update_with_weight`](Self::update_with_weight), reporting
    /// every cell it increments.
    pub fn update_observed<O: Observer>(
        &mut self,
        item: impl AsRef<[u8]>,
        count: u64,
        observer: &mut O,
    ) {
        let item = item.as_ref();
        self.total_weight = self.total_weight.saturating_add(count);
        for row in 0..self.depth {
            let column = self.column(item, row);
            let cell = &mut self.counts[row * self.width + column];
            *cell = cell.saturating_add(count);
            observer.observe(Event::CountMinCell {
                row,
                column,
                value: *cell,
            });
        }
    }

    /// Returns the estimated count of `item`: the minimum of its cells.
    ///
    /// Never less than the true count; items that were never added may still
    /// report a small positive count from collisions.
    pub fn estimate(&self, item: impl AsRef<[u8]>) -> u64 {
        let item = item.as_ref();
        (0..self.depth)
            .map(|row| self.counts[row * self.width + self.column(item, row)])
            .min()
            .unwrap_or(0)
    }

    /// Returns the counters of one row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= depth`.
    pub fn row(&self, row: usize) -> &[u64] {
        let start = row * self.width;
        &self.counts[start..start + self.width]
    }

    /// Checks if two sketches can be merged: same width, depth and seed.
    pub fn is_compatible(&self, other: &CountMinSketch) -> bool {
        self.width == other.width && self.depth == other.depth && self.seed == other.seed
    }

    /// Adds the counters of `other` into this sketch cell by cell.
    ///
    /// # Panics
    ///
    /// Panics if the sketches are not compatible.
    /// Use [`is_compatible()`](Self::is_compatible) to check first.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::countmin::CountMinSketch;
    ///
    /// let mut left = CountMinSketch::new(64, 4).unwrap();
    /// let mut right = CountMinSketch::new(64, 4).unwrap();
    /// left.update_with_weight("apple", 2);
    /// right.update_with_weight("apple", 5);
    ///
    /// left.merge(&right);
    /// assert!(left.estimate("apple") >= 7);
    /// assert_eq!(left.total_weight(), 7);
    /// ```
    pub fn merge(&mut self, other: &CountMinSketch) {
        assert!(
            self.is_compatible(other),
            "Cannot merge incompatible Count-Min sketches"
        );

        for (cell, other_cell) in self.counts.iter_mut().zip(other.counts.iter()) {
            *cell = cell.saturating_add(*other_cell);
        }
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
    }

    fn column(&self, item: &[u8], row: usize) -> usize {
        let (digest, _) = derive_with_seed(item, self.row_seeds[row]);
        (digest % self.width as u64) as usize
    }
}
