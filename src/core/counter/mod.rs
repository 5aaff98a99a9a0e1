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

//! Virtual Counter
//!
//! The timer peripheral does not count by itself. It programs a
//! [`VirtualCounter`] supplied by the surrounding simulator: a free-running
//! 64-bit counter advanced from a reference clock through a divider, with a
//! compare threshold that reports when it has been reached.
//!
//! [`ClockedCounter`] is the reference implementation used by the bundled
//! harness and tests.
//!
//! ## Tick Rate
//!
//! ```text
//! reference cycles ──▶ ÷ divider ──▶ counter += 1
//!                     (accumulator keeps the remainder)
//! ```


/// Counter collaborator consumed by the timer peripheral
///
/// The trait is object safe; the peripheral stores it as
/// `Box<dyn VirtualCounter + Send>`.
pub trait VirtualCounter {
    /// Current counter value
    fn value(&self) -> u64;

    /// Overwrite the counter value
    fn set_value(&mut self, value: u64);

    /// Compare threshold
    fn compare(&self) -> u64;

    /// Overwrite the compare threshold
    fn set_compare(&mut self, compare: u64);

    /// Whether the counter advances
    fn enabled(&self) -> bool;

    /// Start or stop the counter
    fn set_enabled(&mut self, enabled: bool);

    /// Reference cycles per counter increment
    fn divider(&self) -> u32;

    /// Change the tick rate; takes effect for the next advance
    fn set_divider(&mut self, divider: u32);

    /// Return to power-on state
    fn reset(&mut self);

    /// Advance by `cycles` reference-clock cycles
    ///
    /// # Returns
    ///
    /// `true` if the compare threshold was reached during this advance
    fn advance(&mut self, cycles: u64) -> bool;

    /// Reference cycles until the compare threshold is reached
    ///
    /// `None` if the counter is stopped, already at or above compare, or
    /// cannot predict it.
    fn cycles_until_compare(&self) -> Option<u64> {
        None
    }
}

/// Reference counter driven by reference-clock cycles
///
/// # Example
///
/// ```
/// use rvtimer::core::counter::{ClockedCounter, VirtualCounter};
///
/// let mut counter = ClockedCounter::new();
/// counter.set_enabled(true);
/// counter.set_divider(4);
/// counter.set_compare(3);
///
/// assert!(!counter.advance(11));
/// assert_eq!(counter.value(), 2);
/// assert!(counter.advance(1));
/// assert_eq!(counter.value(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ClockedCounter {
    /// Current count
    value: u64,

    /// Compare threshold
    compare: u64,

    /// Counting enabled
    enabled: bool,

    /// Reference cycles per increment (never 0)
    divider: u32,

    /// Reference cycles not yet converted into an increment
    accum: u64,
}

impl ClockedCounter {
    /// Create a stopped counter at 0 with compare at the maximum
    pub fn new() -> Self {
        Self {
            value: 0,
            compare: u64::MAX,
            enabled: false,
            divider: 1,
            accum: 0,
        }
    }
}

impl Default for ClockedCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualCounter for ClockedCounter {
    #[inline(always)]
    fn value(&self) -> u64 {
        self.value
    }

    fn set_value(&mut self, value: u64) {
        self.value = value;
    }

    #[inline(always)]
    fn compare(&self) -> u64 {
        self.compare
    }

    fn set_compare(&mut self, compare: u64) {
        self.compare = compare;
    }

    #[inline(always)]
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline(always)]
    fn divider(&self) -> u32 {
        self.divider
    }

    fn set_divider(&mut self, divider: u32) {
        self.divider = divider.max(1);
        // Partial cycles counted at the old rate are dropped
        self.accum = 0;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn advance(&mut self, cycles: u64) -> bool {
        if !self.enabled || cycles == 0 {
            return false;
        }

        let total = u128::from(self.accum) + u128::from(cycles);
        let divider = u128::from(self.divider);
        let ticks = total / divider;
        // Remainder is below divider, which fits in u32
        self.accum = (total % divider) as u64;

        if ticks == 0 {
            return false;
        }

        let old = self.value;
        let end = u128::from(old) + ticks;
        self.value = end as u64;

        // Reached when compare lies in (old, end], including across a wrap
        let compare = u128::from(self.compare);
        let span = 1u128 << 64;
        let reached = if old < self.compare {
            end >= compare
        } else {
            end >= compare + span
        };

        if reached {
            log::trace!(
                "Counter reached compare 0x{:016X} (value=0x{:016X})",
                self.compare,
                self.value
            );
        }

        reached
    }

    fn cycles_until_compare(&self) -> Option<u64> {
        if !self.enabled || self.value >= self.compare {
            return None;
        }

        let remaining = u128::from(self.compare - self.value);
        let cycles = remaining * u128::from(self.divider) - u128::from(self.accum);
        Some(u64::try_from(cycles).unwrap_or(u64::MAX))
    }
}
