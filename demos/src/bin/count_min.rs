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

//! Feeds a round-robin key stream into a Count-Min sketch and checks the overcount.

use anyhow::Context;
use clap::Parser;
use streamsketch::countmin::CountMinSketch;
use streamsketch::observe::TracingObserver;

#[derive(Debug, Parser)]
#[command(about = "Feeds a round-robin key stream into a Count-Min sketch and checks the overcount")]
struct Args {
    /// Emit a trace record for every internal step of the leading items.
    #[arg(long)]
    trace: bool,
    /// Number of updates in the stream.
    #[arg(long, default_value_t = 1_000_000)]
    items: u64,
    /// Number of distinct keys the stream cycles through.
    #[arg(long, default_value_t = 10_000)]
    distinct: u64,
    /// Columns per row.
    #[arg(long, default_value_t = 4096)]
    width: usize,
    /// Number of rows.
    #[arg(long, default_value_t = 5)]
    depth: usize,
    /// How many leading updates are traced step by step with --trace.
    #[arg(long, default_value_t = 5)]
    trace_items: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    demos::init_tracing(args.trace);
    let trace = args.trace;

    anyhow::ensure!(args.distinct > 0, "--distinct must be positive");
    let mut sketch =
        CountMinSketch::new(args.width, args.depth).context("failed to build Count-Min sketch")?;

    for i in 0..args.items {
        let key = format!("key-{}", i % args.distinct);
        if trace && i < args.trace_items {
            tracing::info!(%key, "update");
            sketch.update_observed(&key, 1, &mut TracingObserver);
        } else {
            sketch.update(&key);
        }
    }

    // the stream is a round robin, so exact counts follow from its length
    let true_count = |key_index: u64| {
        args.items / args.distinct + u64::from(key_index < args.items % args.distinct)
    };

    let mut overcounted = 0u64;
    let mut max_overcount = 0u64;
    for key_index in 0..args.distinct {
        let estimate = sketch.estimate(format!("key-{key_index}"));
        let overcount = estimate - true_count(key_index);
        if overcount > 0 {
            overcounted += 1;
        }
        max_overcount = max_overcount.max(overcount);
    }

    tracing::info!(
        width = sketch.width(),
        depth = sketch.depth(),
        total_weight = sketch.total_weight(),
        error_bound = sketch.error_bound(),
        confidence = sketch.confidence(),
        "sketch built"
    );
    tracing::info!(
        overcounted,
        distinct = args.distinct,
        max_overcount,
        "estimate quality"
    );
    for key_index in 0..args.distinct.min(3) {
        let key = format!("key-{key_index}");
        tracing::info!(
            %key,
            estimate = sketch.estimate(&key),
            exact = true_count(key_index),
            "sample key"
        );
    }
    Ok(())
}
