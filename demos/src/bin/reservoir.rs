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

//! Draws a uniform sample from the stream 1..=items with a reservoir.

use anyhow::Context;
use clap::Parser;
use streamsketch::common::XorShift64;
use streamsketch::observe::TracingObserver;
use streamsketch::reservoir::ReservoirSampler;

#[derive(Debug, Parser)]
#[command(about = "Draws a uniform sample from the stream 1..=items with a reservoir")]
struct Args {
    /// Emit a trace record for every internal step.
    #[arg(long)]
    trace: bool,
    /// Stream length; the stream is 1..=items.
    #[arg(long, default_value_t = 10)]
    items: u64,
    /// Sample size (k).
    #[arg(long, default_value_t = 5)]
    capacity: usize,
    /// Seed for a reproducible run; time-seeded when absent.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    demos::init_tracing(args.trace);
    let trace = args.trace;

    let random = args.seed.map(XorShift64::seeded).unwrap_or_default();
    let mut reservoir = ReservoirSampler::with_random(args.capacity, random)
        .context("failed to build reservoir")?;

    for item in 1..=args.items {
        if trace {
            tracing::info!(item, "offer");
            reservoir.update_observed(item, &mut TracingObserver);
        } else {
            reservoir.update(item);
        }
    }

    tracing::info!(
        seen = reservoir.num_seen(),
        size = reservoir.len(),
        retention_probability = reservoir.len() as f64 / reservoir.num_seen().max(1) as f64,
        "reservoir filled"
    );
    tracing::info!(sample = ?reservoir.sample(), "sample");
    Ok(())
}
