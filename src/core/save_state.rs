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

//! Timer snapshots
//!
//! A snapshot captures everything needed to put an [`RvTimer`] back into
//! the exact state it was in: counter, compare, configuration and the
//! interrupt bookkeeping. The reference-clock accumulator inside the counter
//! is not part of the register state and is not saved.
//!
//! # Snapshot Format
//!
//! Snapshots are serialized using bincode (standard config). The serde
//! derives also allow a human-readable JSON dump.
//!
//! # Version Compatibility
//!
//! Loading a snapshot with a different version fails with a `Snapshot` error.
//!
//! # Example
//!
//! ```no_run
//! use rvtimer::core::counter::ClockedCounter;
//! use rvtimer::core::save_state::TimerSnapshot;
//! use rvtimer::core::timer::RvTimer;
//!
//! let mut timer = RvTimer::new(Box::new(ClockedCounter::new()));
//! timer.write(0x104, 1234).unwrap();
//!
//! timer.snapshot().save_to_file("timer.state").unwrap();
//!
//! let loaded = TimerSnapshot::load_from_file("timer.state").unwrap();
//! timer.restore(&loaded);
//! ```
//!
//! [`RvTimer`]: crate::core::timer::RvTimer

use crate::core::error::{PeripheralError, Result};
use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Snapshot format version
///
/// Incremented whenever the encoded layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned, timestamped timer state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TimerSnapshot {
    /// Version number for compatibility checking
    pub version: u32,

    /// Snapshot metadata
    pub metadata: SnapshotMetadata,

    /// Peripheral state
    pub timer: TimerState,
}

/// Snapshot metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SnapshotMetadata {
    /// Time the snapshot was taken
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Physical base address of the peripheral
    pub base_addr: u32,
}

/// Register-visible timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct TimerState {
    /// Counter value
    pub value: u64,

    /// Compare threshold
    pub compare: u64,

    /// CTRL bit 0
    pub active: bool,

    /// CFG0 prescale field
    pub prescaler: u16,

    /// CFG0 step field
    pub step: u8,

    /// INTR_ENABLE0 bit 0
    pub interrupt_enable: bool,

    /// Sticky INTR_TEST0 force
    pub test_forced: bool,

    /// Interrupt line level at capture time
    pub line: bool,
}

impl TimerSnapshot {
    /// Wrap a captured state with fresh metadata
    pub fn new(base_addr: u32, timer: TimerState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            metadata: SnapshotMetadata {
                timestamp: Utc::now(),
                base_addr,
            },
            timer,
        }
    }

    /// Encode and write to a file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be written, `Snapshot` if encoding fails.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config = config::standard();
        let encoded = bincode::encode_to_vec(self, config)?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Read and decode a file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Snapshot` if decoding fails or
    /// the version does not match [`SNAPSHOT_VERSION`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let config = config::standard();
        let (snapshot, _): (TimerSnapshot, usize) = bincode::decode_from_slice(&buffer, config)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PeripheralError::Snapshot(format!(
                "Incompatible snapshot version: expected {}, got {}",
                SNAPSHOT_VERSION, snapshot.version
            )));
        }

        Ok(snapshot)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// `Snapshot` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PeripheralError::Snapshot(e.to_string()))
    }
}

/// Components that can be captured into and restored from a state value
pub trait StateSave {
    /// The state type for this component
    type State: Serialize + for<'de> Deserialize<'de>;

    /// Capture the current state
    fn to_state(&self) -> Self::State;

    /// Restore from a captured state
    fn restore_from_state(&mut self, state: &Self::State);
}
