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

//! Test fixtures for common timer scenarios

use rvtimer::core::counter::ClockedCounter;
use rvtimer::core::memory::Bus;
use rvtimer::core::timer::{regs, RvTimer, SharedTimer, RV_TIMER_BASE};

/// Create a shared timer at the default base, registered on a fresh bus
#[allow(dead_code)]
pub fn create_timer_on_bus() -> (SharedTimer, Bus) {
    let timer = SharedTimer::new(RvTimer::with_base(
        RV_TIMER_BASE,
        Box::new(ClockedCounter::new()),
    ));
    let mut bus = Bus::new();
    bus.register_device(Box::new(timer.clone()));
    (timer, bus)
}

/// Write a 64-bit value through the bus, low half first
#[allow(dead_code)]
pub fn write64(bus: &mut Bus, low_addr: u32, value: u64) {
    bus.write32(low_addr, value as u32)
        .expect("Failed to write low half");
    bus.write32(low_addr + 4, (value >> 32) as u32)
        .expect("Failed to write high half");
}

/// Program compare, enable the interrupt and start counting
#[allow(dead_code)]
pub fn arm_timer(bus: &mut Bus, compare: u64) {
    write64(bus, RV_TIMER_BASE + regs::COMPARE_LOWER0, compare);
    bus.write32(RV_TIMER_BASE + regs::INTR_ENABLE0, 1)
        .expect("Failed to enable interrupt");
    bus.write32(RV_TIMER_BASE + regs::CTRL, 1)
        .expect("Failed to start timer");
}
