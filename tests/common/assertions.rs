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

//! Custom assertions for timer integration testing

use rvtimer::core::interrupt::IrqLine;
use rvtimer::core::memory::Bus;

/// Assert a bus word has the expected value
#[allow(dead_code)]
pub fn assert_bus_word(bus: &Bus, addr: u32, expected: u32) {
    let actual = bus.read32(addr).expect("Failed to read bus");
    assert_eq!(
        actual, expected,
        "Bus word at 0x{:08X} mismatch: expected 0x{:08X}, got 0x{:08X}",
        addr, expected, actual
    );
}

/// Assert the 64-bit value held by a low/high register pair
#[allow(dead_code)]
pub fn assert_bus_dword(bus: &Bus, low_addr: u32, expected: u64) {
    let low = u64::from(bus.read32(low_addr).expect("Failed to read low half"));
    let high = u64::from(bus.read32(low_addr + 4).expect("Failed to read high half"));
    let actual = (high << 32) | low;
    assert_eq!(
        actual, expected,
        "64-bit value at 0x{:08X} mismatch: expected 0x{:016X}, got 0x{:016X}",
        low_addr, expected, actual
    );
}

/// Assert the interrupt line level
#[allow(dead_code)]
pub fn assert_line(line: &IrqLine, expected: bool) {
    assert_eq!(
        line.is_set(),
        expected,
        "Interrupt line {} should be {}",
        line.name(),
        if expected { "high" } else { "low" }
    );
}
