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

//! Interrupt Line Implementation
//!
//! A peripheral drives a level-sensitive interrupt line; whatever consumes
//! interrupts (a CPU core, a PLIC model, a test) holds a clone of the same
//! [`IrqLine`] and observes the level.
//!
//! ```text
//!  ┌────────────┐  set(level)  ┌─────────┐  is_set()  ┌──────────┐
//!  │ Peripheral │ ───────────▶ │ IrqLine │ ◀───────── │ Consumer │
//!  └────────────┘              └─────────┘            └──────────┘
//! ```
//!
//! The level lives behind an `Arc`, so clones can be handed to a consumer
//! running on another thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct LineState {
    level: AtomicBool,
    rising_edges: AtomicU64,
}

/// Level-sensitive interrupt line
///
/// # Example
///
/// ```
/// use rvtimer::core::interrupt::IrqLine;
///
/// let line = IrqLine::new("timer");
/// let consumer = line.clone();
///
/// line.set(true);
/// assert!(consumer.is_set());
///
/// line.set(false);
/// assert!(!consumer.is_set());
/// assert_eq!(consumer.rising_edges(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct IrqLine {
    /// Line name (for logging)
    name: &'static str,

    /// Shared level and edge count
    state: Arc<LineState>,
}

impl IrqLine {
    /// Create a new deasserted line
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(LineState::default()),
        }
    }

    /// Drive the line to `level`
    ///
    /// Level changes are logged; driving the current level again is silent.
    pub fn set(&self, level: bool) {
        let previous = self.state.level.swap(level, Ordering::AcqRel);

        if previous != level {
            if level {
                self.state.rising_edges.fetch_add(1, Ordering::Relaxed);
            }
            log::debug!(
                "IRQ {} {}",
                self.name,
                if level { "asserted" } else { "deasserted" }
            );
        }
    }

    /// Current line level
    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.state.level.load(Ordering::Acquire)
    }

    /// Number of low-to-high transitions seen since creation
    pub fn rising_edges(&self) -> u64 {
        self.state.rising_edges.load(Ordering::Relaxed)
    }

    /// Line name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for IrqLine {
    fn default() -> Self {
        Self::new("irq")
    }
}
