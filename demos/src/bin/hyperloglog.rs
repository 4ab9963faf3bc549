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

//! Estimates the number of distinct items in a stream with HyperLogLog.

use anyhow::Context;
use clap::Parser;
use streamsketch::hll::HyperLogLog;
use streamsketch::observe::TracingObserver;

#[derive(Debug, Parser)]
#[command(about = "Estimates the number of distinct items in a stream with HyperLogLog")]
struct Args {
    /// Emit a trace record for every internal step of the leading items.
    #[arg(long)]
    trace: bool,
    /// Number of distinct items in the stream.
    #[arg(long, default_value_t = 1_000_000)]
    items: u64,
    /// How many times each item is repeated.
    #[arg(long, default_value_t = 1)]
    repeat: u32,
    /// Number of registers (m).
    #[arg(long, default_value_t = 4096)]
    registers: u32,
    /// How many leading updates are traced step by step with --trace.
    #[arg(long, default_value_t = 5)]
    trace_items: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    demos::init_tracing(args.trace);
    let trace = args.trace;

    let mut sketch = HyperLogLog::new(args.registers).context("failed to build HyperLogLog")?;

    let mut step = 0u64;
    for _ in 0..args.repeat {
        for i in 0..args.items {
            let item = format!("item-{i}");
            if trace && step < args.trace_items {
                tracing::info!(%item, "update");
                sketch.update_observed(&item, &mut TracingObserver);
            } else {
                sketch.update(&item);
            }
            step += 1;
        }
    }

    let estimate = sketch.estimate();
    let exact = args.items as f64;
    let relative_error = if exact > 0.0 {
        (estimate - exact).abs() / exact
    } else {
        0.0
    };
    tracing::info!(
        registers = sketch.num_registers(),
        empty_registers = sketch.num_zeros(),
        relative_standard_error = sketch.relative_standard_error(),
        "sketch built"
    );
    tracing::info!(
        distinct = args.items,
        estimate,
        relative_error,
        "cardinality"
    );
    Ok(())
}
