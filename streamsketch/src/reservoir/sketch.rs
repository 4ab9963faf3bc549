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

use crate::common::RandomSource;
use crate::common::XorShift64;
use crate::error::Error;
use crate::observe::Event;
use crate::observe::NoopObserver;
use crate::observe::Observer;

/// Uniform fixed-size sample of a stream.
///
/// Holds at most `capacity` items. After `n` updates every item has been
/// retained with probability `min(1, capacity / n)`, independent of arrival
/// order.
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T, R = XorShift64> {
    capacity: usize,
    seen: u64,
    sample: Vec<T>,
    random: R,
}

impl<T> ReservoirSampler<T> {
    /// Creates an empty reservoir of `capacity` items with a time-seeded
    /// [`XorShift64`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::with_random(capacity, XorShift64::default())
    }
}

impl<T, R: RandomSource> ReservoirSampler<T, R> {
    /// Creates an empty reservoir of `capacity` items drawing from `random`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamsketch::common::XorShift64;
    /// use streamsketch::reservoir::ReservoirSampler;
    ///
    /// assert!(ReservoirSampler::<u32, _>::with_random(0, XorShift64::seeded(1)).is_err());
    /// ```
    pub fn with_random(capacity: usize, random: R) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::config_invalid("capacity must be positive")
                .with_context("capacity", capacity));
        }

        Ok(ReservoirSampler {
            capacity,
            seen: 0,
            sample: Vec::with_capacity(capacity),
            random,
        })
    }

    /// Offers the next stream item to the reservoir.
    pub fn update(&mut self, item: T) {
        self.update_observed(item, &mut NoopObserver);
    }

    /// Same as [`update`](Self::update), reporting whether the item was
    /// appended, replaced a slot, or was skipped.
    pub fn update_observed<O: Observer>(&mut self, item: T, observer: &mut O) {
        self.seen += 1;

        if self.sample.len() < self.capacity {
            self.sample.push(item);
            observer.observe(Event::ReservoirAppend {
                slot: self.sample.len() - 1,
                seen: self.seen,
            });
            return;
        }

        // draw over the 1-indexed position of this item
        let draw = self.random.next_bounded(self.seen);
        if draw < self.capacity as u64 {
            let slot = draw as usize;
            self.sample[slot] = item;
            observer.observe(Event::ReservoirReplace {
                slot,
                seen: self.seen,
            });
        } else {
            observer.observe(Event::ReservoirSkip {
                draw,
                seen: self.seen,
            });
        }
    }
}

impl<T, R> ReservoirSampler<T, R> {
    /// Returns the current sample without modifying the reservoir.
    pub fn sample(&self) -> &[T] {
        &self.sample
    }

    /// Consumes the reservoir, returning the sample.
    pub fn into_sample(self) -> Vec<T> {
        self.sample
    }

    /// Returns the number of items currently held: `min(capacity, num_seen)`.
    pub fn len(&self) -> usize {
        self.sample.len()
    }

    /// Returns true if no item has been offered yet.
    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    /// Returns the maximum sample size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of items offered so far.
    pub fn num_seen(&self) -> u64 {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = ReservoirSampler::<u8>::new(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(err.context_value("capacity"), Some("0"));
    }

    #[test]
    fn test_fills_before_replacing() {
        let mut reservoir = ReservoirSampler::with_random(4, XorShift64::seeded(1)).unwrap();
        assert!(reservoir.is_empty());
        for i in 0..4 {
            reservoir.update(i);
        }
        assert_eq!(reservoir.sample(), &[0, 1, 2, 3]);
        assert_eq!(reservoir.capacity(), 4);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let run = || {
            let mut reservoir = ReservoirSampler::with_random(5, XorShift64::seeded(42)).unwrap();
            for i in 1..=10 {
                reservoir.update(i);
            }
            reservoir.into_sample()
        };
        assert_eq!(run(), vec![6, 9, 3, 10, 8]);
        assert_eq!(run(), run());
    }

    #[test]
    fn test_borrowed_random_source() {
        let mut rng = XorShift64::seeded(42);
        let mut reservoir = ReservoirSampler::with_random(5, &mut rng).unwrap();
        for i in 1..=10 {
            reservoir.update(i);
        }
        assert_eq!(reservoir.sample(), &[6, 9, 3, 10, 8]);
    }

    #[test]
    fn test_observed_events() {
        let mut reservoir = ReservoirSampler::with_random(2, XorShift64::seeded(9)).unwrap();
        let mut events = Vec::new();
        for i in 0..50 {
            reservoir.update_observed(i, &mut |event: Event| events.push(event));
        }

        assert_eq!(events.len(), 50);
        assert_eq!(events[0], Event::ReservoirAppend { slot: 0, seen: 1 });
        assert_eq!(events[1], Event::ReservoirAppend { slot: 1, seen: 2 });
        for (i, event) in events.iter().enumerate().skip(2) {
            let seen = i as u64 + 1;
            match *event {
                Event::ReservoirReplace { slot, seen: s } => {
                    assert!(slot < 2);
                    assert_eq!(s, seen);
                }
                Event::ReservoirSkip { draw, seen: s } => {
                    assert!((2..seen).contains(&draw));
                    assert_eq!(s, seen);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }
}
