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

//! Timer shared between a bus thread and a clock thread
//!
//! All peripheral state sits behind one mutex, so a bus access never
//! observes a half-updated 64-bit value while the clock side is ticking.

use super::RvTimer;
use crate::core::error::{PeripheralError, Result};
use crate::core::interrupt::IrqLine;
use crate::core::memory::IODevice;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to a mutex-protected [`RvTimer`]
///
/// # Example
///
/// ```
/// use rvtimer::core::counter::ClockedCounter;
/// use rvtimer::core::memory::IODevice;
/// use rvtimer::core::timer::{RvTimer, SharedTimer};
///
/// let timer = SharedTimer::new(RvTimer::new(Box::new(ClockedCounter::new())));
/// let mut bus_side = timer.clone();
///
/// bus_side.write_register(0x104, 42).unwrap();
/// assert_eq!(timer.read_register(0x104).unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct SharedTimer {
    inner: Arc<Mutex<RvTimer>>,

    /// Line handle, readable without taking the lock
    irq: IrqLine,

    /// Range cached at construction; the base never changes
    range: (u32, u32),
}

impl SharedTimer {
    /// Wrap a timer
    pub fn new(timer: RvTimer) -> Self {
        let irq = timer.irq().clone();
        let range = timer.address_range();
        Self {
            inner: Arc::new(Mutex::new(timer)),
            irq,
            range,
        }
    }

    /// Take the peripheral lock
    ///
    /// # Errors
    ///
    /// `LockPoisoned` if a holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, RvTimer>> {
        self.inner
            .lock()
            .map_err(|_| PeripheralError::LockPoisoned("rv_timer"))
    }

    /// Advance the clock under the lock
    ///
    /// # Returns
    ///
    /// Interrupt line level after the advance
    pub fn tick(&self, cycles: u64) -> Result<bool> {
        Ok(self.lock()?.tick(cycles))
    }

    /// Deliver the compare-reached notification under the lock
    pub fn on_compare_reached(&self) -> Result<()> {
        self.lock()?.on_compare_reached();
        Ok(())
    }

    /// Interrupt output line
    pub fn irq(&self) -> &IrqLine {
        &self.irq
    }
}

impl IODevice for SharedTimer {
    fn address_range(&self) -> (u32, u32) {
        self.range
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        self.lock()?.read(offset)
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        self.lock()?.write(offset, value)
    }

    /// Reset even if a previous holder panicked
    ///
    /// Reset overwrites every field, so the recovered state is consistent
    /// again afterwards and the poison flag is cleared.
    fn reset(&mut self) {
        let mut timer = self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("rv_timer lock poisoned, recovering for reset");
            poisoned.into_inner()
        });
        timer.reset();
        drop(timer);
        self.inner.clear_poison();
    }

    fn name(&self) -> &str {
        "rv_timer"
    }
}
