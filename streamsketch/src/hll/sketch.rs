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

use super::MAX_RANK;
use super::estimator;
use super::rank;
use super::split_digest;
use crate::error::Error;
use crate::hash::DEFAULT_SEED;
use crate::hash::derive_with_seed;
use crate::observe::Event;
use crate::observe::NoopObserver;
use crate::observe::Observer;

const MAX_NUM_REGISTERS: u32 = 1 << 26;

/// HyperLogLog distinct-count sketch over `m` byte-sized registers.
///
/// Registers only ever grow, so updating with an item that was seen before
/// leaves the sketch unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperLogLog {
    seed: u32,
    /// Number of registers still at zero
    num_zeros: u32,
    registers: Box<[u8]>,
}

impl HyperLogLog {
    /// Creates an empty sketch with `num_registers` registers.
    ///
    /// Any positive register count works; powers of two such as 1024 or 4096
    /// are the usual choice.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if `num_registers` is zero or larger than `2^26`.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::hll::HyperLogLog;
    ///
    /// let sketch = HyperLogLog::new(1024).unwrap();
    /// assert_eq!(sketch.estimate(), 0.0);
    /// assert!(HyperLogLog::new(0).is_err());
    /// ```
    pub fn new(num_registers: u32) -> Result<Self, Error> {
        Self::with_seed(num_registers, DEFAULT_SEED)
    }

    /// Same as [`HyperLogLog::new`] with an explicit hash seed.
    pub fn with_seed(num_registers: u32, seed: u32) -> Result<Self, Error> {
        if num_registers == 0 || num_registers > MAX_NUM_REGISTERS {
            return Err(Error::config_invalid(format!(
                "num_registers must be in [1, {MAX_NUM_REGISTERS}]"
            ))
            .with_context("num_registers", num_registers));
        }

        Ok(HyperLogLog {
            seed,
            num_zeros: num_registers,
            registers: vec![0u8; num_registers as usize].into_boxed_slice(),
        })
    }

    /// Adds an item.
    pub fn update(&mut self, item: impl AsRef<[u8]>) {
        self.update_observed(item, &mut NoopObserver);
    }

    /// Same as [`update`](Self::update), reporting the register comparison.
    pub fn update_observed<O: Observer>(&mut self, item: impl AsRef<[u8]>, observer: &mut O) {
        let (digest, _) = derive_with_seed(item.as_ref(), self.seed);
        let (w, z) = split_digest(digest);

        let register = (w % self.num_registers()) as usize;
        let rank = rank(z);
        let previous = self.registers[register];
        observer.observe(Event::HllRegister {
            register,
            rank,
            previous,
        });

        if rank > previous {
            self.registers[register] = rank;
            if previous == 0 {
                self.num_zeros -= 1;
            }
        }
    }

    /// Returns the estimated number of distinct items added.
    ///
    /// This only reads the registers and can be called at any time. An empty
    /// sketch estimates exactly zero.
    pub fn estimate(&self) -> f64 {
        estimator::estimate(&self.registers, self.num_zeros)
    }

    /// Returns the expected relative standard error `1.04 / sqrt(m)`.
    pub fn relative_standard_error(&self) -> f64 {
        1.04 / f64::from(self.num_registers()).sqrt()
    }

    /// Returns the number of registers.
    pub fn num_registers(&self) -> u32 {
        self.registers.len() as u32
    }

    /// Returns the registers. Each holds a rank in `0..=32`.
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Returns the number of registers still at zero.
    pub fn num_zeros(&self) -> u32 {
        self.num_zeros
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.num_zeros == self.num_registers()
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Checks if two sketches can be merged: same register count and seed.
    pub fn is_compatible(&self, other: &HyperLogLog) -> bool {
        self.registers.len() == other.registers.len() && self.seed == other.seed
    }

    /// Merges `other` into this sketch by taking the per-register maximum.
    ///
    /// The result is the sketch of the union of both streams.
    ///
    /// # Panics
    ///
    /// Panics if the sketches are not compatible.
    /// Use [`is_compatible()`](Self::is_compatible) to check first.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::hll::HyperLogLog;
    ///
    /// let mut left = HyperLogLog::new(1024).unwrap();
    /// let mut right = HyperLogLog::new(1024).unwrap();
    /// for i in 0..500 {
    ///     left.update(format!("item-{i}"));
    ///     right.update(format!("item-{}", i + 250));
    /// }
    /// left.merge(&right);
    /// assert!((left.estimate() - 750.0).abs() < 75.0);
    /// ```
    pub fn merge(&mut self, other: &HyperLogLog) {
        assert!(
            self.is_compatible(other),
            "Cannot merge incompatible HyperLogLog sketches"
        );

        for (register, &other_register) in self.registers.iter_mut().zip(other.registers.iter()) {
            *register = (*register).max(other_register);
        }
        self.num_zeros = self.registers.iter().filter(|&&value| value == 0).count() as u32;
        debug_assert!(self.registers.iter().all(|&value| value <= MAX_RANK));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_rejects_bad_register_counts() {
        let err = HyperLogLog::new(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(HyperLogLog::new(MAX_NUM_REGISTERS + 1).is_err());
        assert!(HyperLogLog::new(MAX_NUM_REGISTERS).is_ok());
    }

    #[test]
    fn test_empty_sketch() {
        let sketch = HyperLogLog::new(64).unwrap();
        assert!(sketch.is_empty());
        assert_eq!(sketch.num_zeros(), 64);
        assert_eq!(sketch.estimate(), 0.0);
        assert!(sketch.registers().iter().all(|&r| r == 0));
    }

    #[test]
    fn test_single_item_touches_one_register() {
        let mut sketch = HyperLogLog::new(256).unwrap();
        sketch.update("apple");
        assert_eq!(sketch.num_zeros(), 255);
        let touched: Vec<_> = sketch.registers().iter().filter(|&&r| r > 0).collect();
        assert_eq!(touched.len(), 1);
        assert!(*touched[0] >= 1 && *touched[0] <= MAX_RANK);
        // 256 * ln(256 / 255)
        assert!((sketch.estimate() - 1.002).abs() < 1e-3);
    }

    #[test]
    fn test_observed_update() {
        let mut sketch = HyperLogLog::new(128).unwrap();
        let mut events = Vec::new();
        sketch.update_observed("apple", &mut |event: Event| events.push(event));
        sketch.update_observed("apple", &mut |event: Event| events.push(event));

        assert_eq!(events.len(), 2);
        let Event::HllRegister {
            register,
            rank,
            previous,
        } = events[0]
        else {
            panic!("unexpected event {:?}", events[0]);
        };
        assert_eq!(previous, 0);
        assert_eq!(sketch.registers()[register], rank);
        assert_eq!(
            events[1],
            Event::HllRegister {
                register,
                rank,
                previous: rank,
            }
        );
    }

    #[test]
    fn test_non_power_of_two_registers() {
        let mut sketch = HyperLogLog::new(1000).unwrap();
        for i in 0..2000 {
            sketch.update(format!("item-{i}"));
        }
        let estimate = sketch.estimate();
        assert!((estimate - 2000.0).abs() < 2000.0 * 0.15, "estimate {estimate}");
    }

    #[test]
    #[should_panic(expected = "Cannot merge incompatible HyperLogLog sketches")]
    fn test_merge_incompatible_panics() {
        let mut left = HyperLogLog::new(64).unwrap();
        let right = HyperLogLog::with_seed(64, 7).unwrap();
        left.merge(&right);
    }

    #[test]
    fn test_merge_recounts_zeros() {
        let mut left = HyperLogLog::new(64).unwrap();
        let mut right = HyperLogLog::new(64).unwrap();
        left.update("a");
        right.update("b");
        right.update("c");
        left.merge(&right);
        let zeros = left.registers().iter().filter(|&&r| r == 0).count() as u32;
        assert_eq!(left.num_zeros(), zeros);
        assert!(zeros < 64);
    }
}
