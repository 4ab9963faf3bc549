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

//! Inserts a synthetic stream into a Bloom filter and measures its false positive rate.

use anyhow::Context;
use clap::Parser;
use streamsketch::bloom::BloomFilter;
use streamsketch::observe::TracingObserver;

#[derive(Debug, Parser)]
#[command(about = "Inserts a synthetic stream into a Bloom filter and measures its false positive rate")]
struct Args {
    /// Emit a trace record for every internal step of the leading items.
    #[arg(long)]
    trace: bool,
    /// Number of distinct items to insert.
    #[arg(long, default_value_t = 100_000)]
    items: u64,
    /// Filter bits per inserted item.
    #[arg(long, default_value_t = 10)]
    bits_per_item: u64,
    /// Number of hash functions (k).
    #[arg(long, default_value_t = 5)]
    hashes: u32,
    /// How many leading items are traced step by step with --trace.
    #[arg(long, default_value_t = 5)]
    trace_items: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    demos::init_tracing(args.trace);
    let trace = args.trace;

    let num_bits = args
        .items
        .checked_mul(args.bits_per_item)
        .context("filter size overflows")?;
    let mut filter =
        BloomFilter::new(num_bits, args.hashes).context("failed to build Bloom filter")?;

    for i in 0..args.items {
        let item = format!("element-{i}");
        if trace && i < args.trace_items {
            tracing::info!(%item, "insert");
            filter.insert_observed(&item, &mut TracingObserver);
        } else {
            filter.insert(&item);
        }
    }

    // probe with items that were never inserted
    let mut false_positives = 0u64;
    for i in 0..args.items {
        let item = format!("missing-{i}");
        let found = if trace && i < args.trace_items {
            tracing::info!(%item, "lookup");
            filter.contains_observed(&item, &mut TracingObserver)
        } else {
            filter.contains(&item)
        };
        if found {
            false_positives += 1;
        }
    }

    let measured = false_positives as f64 / args.items.max(1) as f64;
    tracing::info!(
        capacity_bits = filter.capacity(),
        num_hashes = filter.num_hashes(),
        size_bytes = filter.size_bytes(),
        load_factor = filter.load_factor(),
        "filter built"
    );
    tracing::info!(
        false_positives,
        measured_fpp = measured,
        theoretical_fpp = BloomFilter::theoretical_fpp(num_bits, args.hashes, args.items),
        estimated_fpp = filter.estimated_fpp(),
        "false positive rate"
    );
    Ok(())
}
