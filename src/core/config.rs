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

//! Harness configuration
//!
//! A TOML file describing where the timer sits, how long to clock it and
//! which register writes to apply before the clock starts.
//!
//! ```toml
//! [timer]
//! base_addr = 0x40100000
//!
//! [run]
//! cycles = 100000
//! batch = 64
//!
//! [[writes]]
//! offset = 0x100
//! value = 0x00050009
//! ```
//!
//! Every section is optional.

use crate::core::error::{PeripheralError, Result};
use crate::core::timer::{RV_TIMER_BASE, RV_TIMER_MAX_BASE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub run: RunConfig,

    /// Register writes applied in order before the run
    #[serde(default)]
    pub writes: Vec<RegisterWrite>,
}

/// Peripheral placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_base_addr")]
    pub base_addr: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            base_addr: default_base_addr(),
        }
    }
}

/// Clock run length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Total reference-clock cycles
    #[serde(default = "default_cycles")]
    pub cycles: u64,

    /// Cycles per advance; the line is sampled between batches
    #[serde(default = "default_batch")]
    pub batch: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cycles: default_cycles(),
            batch: default_batch(),
        }
    }
}

/// One register write, offset relative to the timer base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterWrite {
    pub offset: u32,
    pub value: u32,
}

fn default_base_addr() -> u32 {
    RV_TIMER_BASE
}
fn default_cycles() -> u64 {
    10_000
}
fn default_batch() -> u64 {
    64
}

impl SimConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// `Config` if the document is malformed, `InvalidConfig` if the timer
    /// span would run past the top of the address space.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: SimConfig = toml::from_str(content)?;
        if config.timer.base_addr > RV_TIMER_MAX_BASE {
            return Err(PeripheralError::InvalidConfig(format!(
                "timer.base_addr 0x{:08X} leaves no room for the register span (max 0x{:08X})",
                config.timer.base_addr, RV_TIMER_MAX_BASE
            )));
        }
        if config.run.batch == 0 {
            log::warn!("run.batch is 0, using 1");
            config.run.batch = 1;
        }
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Config` if it is malformed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;

        log::info!(
            "Loaded config from {} ({} write(s))",
            path.display(),
            config.writes.len()
        );
        Ok(config)
    }
}
