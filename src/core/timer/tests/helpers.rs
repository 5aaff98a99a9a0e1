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

//! Test helpers: a fake counter whose state the test can inspect

use super::super::*;
use crate::core::counter::ClockedCounter;
use std::sync::{Arc, Mutex};

/// State behind a [`FakeCounter`]
#[derive(Debug, Default)]
pub struct FakeState {
    pub value: u64,
    pub compare: u64,
    pub enabled: bool,
    pub divider: u32,
    pub resets: u32,
    pub divider_writes: Vec<u32>,
    /// Result returned by the next `advance` call
    pub reach_on_advance: bool,
}

/// Counter that never counts on its own; tests drive it directly
#[derive(Clone, Default)]
pub struct FakeCounter {
    pub state: Arc<Mutex<FakeState>>,
}

impl VirtualCounter for FakeCounter {
    fn value(&self) -> u64 {
        self.state.lock().unwrap().value
    }

    fn set_value(&mut self, value: u64) {
        self.state.lock().unwrap().value = value;
    }

    fn compare(&self) -> u64 {
        self.state.lock().unwrap().compare
    }

    fn set_compare(&mut self, compare: u64) {
        self.state.lock().unwrap().compare = compare;
    }

    fn enabled(&self) -> bool {
        self.state.lock().unwrap().enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.state.lock().unwrap().enabled = enabled;
    }

    fn divider(&self) -> u32 {
        self.state.lock().unwrap().divider
    }

    fn set_divider(&mut self, divider: u32) {
        let mut state = self.state.lock().unwrap();
        state.divider = divider;
        state.divider_writes.push(divider);
    }

    fn reset(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.value = 0;
        state.compare = u64::MAX;
        state.enabled = false;
        state.divider = 1;
        state.resets += 1;
    }

    fn advance(&mut self, _cycles: u64) -> bool {
        std::mem::take(&mut self.state.lock().unwrap().reach_on_advance)
    }
}

/// Timer over a fake counter, plus a handle to inspect the fake
pub fn fake_timer() -> (RvTimer, FakeCounter) {
    let fake = FakeCounter::default();
    let timer = RvTimer::new(Box::new(fake.clone()));
    (timer, fake)
}

/// Timer over the reference clocked counter
pub fn clocked_timer() -> RvTimer {
    RvTimer::new(Box::new(ClockedCounter::new()))
}

/// Program a 64-bit value through its two halves
pub fn write64(timer: &mut RvTimer, low_offset: u32, value: u64) {
    timer.write(low_offset, value as u32).unwrap();
    timer.write(low_offset + 4, (value >> 32) as u32).unwrap();
}

/// Read a 64-bit value through its two halves
pub fn read64(timer: &RvTimer, low_offset: u32) -> u64 {
    let low = u64::from(timer.read(low_offset).unwrap());
    let high = u64::from(timer.read(low_offset + 4).unwrap());
    (high << 32) | low
}

/// Enable counting and interrupts with the given compare threshold
pub fn arm(timer: &mut RvTimer, compare: u64) {
    write64(timer, regs::COMPARE_LOWER0, compare);
    timer.write(regs::INTR_ENABLE0, 1).unwrap();
    timer.write(regs::CTRL, 1).unwrap();
}
