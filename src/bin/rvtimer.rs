// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use log::{error, info};
use rvtimer::core::config::SimConfig;
use rvtimer::core::counter::ClockedCounter;
use rvtimer::core::error::{PeripheralError, Result};
use rvtimer::core::memory::Bus;
use rvtimer::core::save_state::TimerSnapshot;
use rvtimer::core::timer::{RvTimer, SharedTimer};
use std::path::PathBuf;

/// RISC-V timer peripheral harness
#[derive(Parser)]
#[command(name = "rvtimer")]
#[command(about = "Clock an rv_timer model and report its interrupt line", long_about = None)]
struct Args {
    /// Path to a TOML run configuration
    config: Option<PathBuf>,

    /// Override the number of reference-clock cycles to run
    #[arg(short = 'n', long)]
    cycles: Option<u64>,

    /// Write a snapshot after the run
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Restore a snapshot before applying the configured writes
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Print the final state as JSON
    #[arg(long)]
    dump_state: bool,
}

fn main() -> Result<()> {
    // Load .env before the logger reads RUST_LOG
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("rvtimer v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load_from_file(path).inspect_err(|e| {
            error!("Failed to load config {}: {}", path.display(), e);
        })?,
        None => SimConfig::default(),
    };
    if let Some(cycles) = args.cycles {
        config.run.cycles = cycles;
    }

    let base = config.timer.base_addr;
    let timer = SharedTimer::new(RvTimer::with_base(base, Box::new(ClockedCounter::new())));

    let mut bus = Bus::new();
    bus.register_device(Box::new(timer.clone()));

    if let Some(path) = &args.load_state {
        let snapshot = TimerSnapshot::load_from_file(path)?;
        info!(
            "Restored snapshot from {} (taken {})",
            path.display(),
            snapshot.metadata.timestamp
        );
        timer.lock()?.restore(&snapshot);
    }

    for write in &config.writes {
        let addr = base.checked_add(write.offset).ok_or_else(|| {
            PeripheralError::InvalidConfig(format!(
                "write offset 0x{:X} overflows base 0x{:08X}",
                write.offset, base
            ))
        })?;
        bus.write32(addr, write.value).inspect_err(|e| {
            error!("Configured write to 0x{:08X} failed: {}", addr, e);
        })?;
    }

    match timer.lock()?.counter().cycles_until_compare() {
        Some(cycles) => info!("Compare match expected after {} cycles", cycles),
        None => info!("No compare match pending"),
    }

    info!(
        "Running {} cycles in batches of {}",
        config.run.cycles, config.run.batch
    );

    let mut elapsed = 0u64;
    let mut level = timer.irq().is_set();
    while elapsed < config.run.cycles {
        let batch = config.run.batch.min(config.run.cycles - elapsed);
        let now = timer.tick(batch)?;
        elapsed += batch;

        if now != level {
            info!(
                "Cycle {}: interrupt line {}",
                elapsed,
                if now { "asserted" } else { "deasserted" }
            );
            level = now;
        }
    }

    let snapshot = timer.lock()?.snapshot();

    if args.dump_state {
        println!("{}", snapshot.to_json()?);
    }

    if let Some(path) = &args.save_state {
        snapshot.save_to_file(path)?;
        info!("Snapshot written to {}", path.display());
    }

    info!("Run completed");
    info!("Cycles: {}", elapsed);
    info!("Counter: 0x{:016X}", snapshot.timer.value);
    info!("Compare: 0x{:016X}", snapshot.timer.compare);
    info!(
        "Interrupt line: {} ({} rising edge(s))",
        if snapshot.timer.line { "high" } else { "low" },
        timer.irq().rising_edges()
    );

    Ok(())
}
