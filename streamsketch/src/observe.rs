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

//! Observer hook for step-by-step inspection of sketch updates.
//!
//! Every structure has exactly one update path. The plain methods (`insert`,
//! `update`, ...) run it with [`NoopObserver`], which compiles away; the
//! `*_observed` variants accept any [`Observer`] and report each internal step
//! as an [`Event`]. [`TracingObserver`] forwards the events to `tracing`, and
//! any `FnMut(Event)` closure is an observer too.
//!
//! # Usage
//!
//! ```rust
//! use streamsketch::countmin::CountMinSketch;
//! use streamsketch::observe::Event;
//!
//! let mut sketch = CountMinSketch::new(64, 3).unwrap();
//! let mut cells = Vec::new();
//! sketch.update_observed("apple", 1, &mut |event: Event| {
//!     if let Event::CountMinCell { row, value, .. } = event {
//!         cells.push((row, value));
//!     }
//! });
//! assert_eq!(cells, vec![(0, 1), (1, 1), (2, 1)]);
//! ```

/// A single internal step of a sketch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A Bloom filter insertion touched a bit.
    BloomBitSet {
        /// Which of the `k` simulated hash functions produced the index.
        hash_index: u32,
        /// Global bit index in `[0, capacity)`.
        bit_index: u64,
        /// Index of the 64-bit word holding the bit.
        word_index: usize,
        /// Offset of the bit inside its word.
        bit_offset: u32,
        /// Whether the bit was previously unset.
        newly_set: bool,
    },
    /// A Bloom filter lookup probed a bit.
    BloomBitProbe {
        /// Which of the `k` simulated hash functions produced the index.
        hash_index: u32,
        /// Global bit index in `[0, capacity)`.
        bit_index: u64,
        /// Whether the bit was set. A lookup stops at the first unset bit.
        is_set: bool,
    },
    /// A Count-Min update incremented a cell.
    CountMinCell {
        /// Row of the cell, in `[0, depth)`.
        row: usize,
        /// Column the row's hash picked, in `[0, width)`.
        column: usize,
        /// Cell value after the increment.
        value: u64,
    },
    /// A HyperLogLog update compared a candidate rank against a register.
    HllRegister {
        /// Register the item hashed to.
        register: usize,
        /// Candidate rank of the item.
        rank: u8,
        /// Register value before the update; the new value is `max(previous, rank)`.
        previous: u8,
    },
    /// The reservoir was not yet full and the item was appended.
    ReservoirAppend {
        /// Slot the item was written to.
        slot: usize,
        /// Items seen so far, including this one.
        seen: u64,
    },
    /// The reservoir was full and the item replaced the one in `slot`.
    ReservoirReplace {
        /// Slot that was overwritten, equal to the random draw.
        slot: usize,
        /// Items seen so far, including this one.
        seen: u64,
    },
    /// The reservoir was full and the item was discarded.
    ReservoirSkip {
        /// Random draw in `[0, seen)`, at least the capacity.
        draw: u64,
        /// Items seen so far, including this one.
        seen: u64,
    },
}

/// A sink for [`Event`]s emitted by the `*_observed` sketch methods.
pub trait Observer {
    /// Receives one event.
    fn observe(&mut self, event: Event);
}

impl<F: FnMut(Event)> Observer for F {
    fn observe(&mut self, event: Event) {
        self(event)
    }
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline(always)]
    fn observe(&mut self, _event: Event) {}
}

/// Observer that emits every event as a `tracing` record at TRACE level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&mut self, event: Event) {
        match event {
            Event::BloomBitSet {
                hash_index,
                bit_index,
                word_index,
                bit_offset,
                newly_set,
            } => tracing::trace!(
                hash_index,
                bit_index,
                word_index,
                bit_offset,
                newly_set,
                "bloom bit set"
            ),
            Event::BloomBitProbe {
                hash_index,
                bit_index,
                is_set,
            } => tracing::trace!(hash_index, bit_index, is_set, "bloom bit probed"),
            Event::CountMinCell { row, column, value } => {
                tracing::trace!(row, column, value, "count-min cell incremented")
            }
            Event::HllRegister {
                register,
                rank,
                previous,
            } => tracing::trace!(
                register,
                rank,
                previous,
                updated = rank > previous,
                "hll register compared"
            ),
            Event::ReservoirAppend { slot, seen } => {
                tracing::trace!(slot, seen, "reservoir append")
            }
            Event::ReservoirReplace { slot, seen } => {
                tracing::trace!(slot, seen, "reservoir replace")
            }
            Event::ReservoirSkip { draw, seen } => {
                tracing::trace!(draw, seen, "reservoir skip")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer_collects() {
        let mut events = Vec::new();
        let mut observer = |event: Event| events.push(event);
        observer.observe(Event::ReservoirAppend { slot: 0, seen: 1 });
        observer.observe(Event::ReservoirSkip { draw: 7, seen: 8 });
        assert_eq!(
            events,
            vec![
                Event::ReservoirAppend { slot: 0, seen: 1 },
                Event::ReservoirSkip { draw: 7, seen: 8 },
            ]
        );
    }

    #[test]
    fn test_tracing_observer_without_subscriber() {
        let mut observer = TracingObserver;
        observer.observe(Event::HllRegister {
            register: 3,
            rank: 2,
            previous: 1,
        });
        observer.observe(Event::CountMinCell {
            row: 0,
            column: 1,
            value: 2,
        });
    }
}
