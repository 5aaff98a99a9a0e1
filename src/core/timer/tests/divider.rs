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

//! CFG0 prescale/step and divider tests

use super::super::*;
use super::helpers::*;

fn cfg0(prescale: u32, step: u32) -> u32 {
    (step << 16) | prescale
}

#[test]
fn test_divider_function() {
    assert_eq!(divider(0, 0), 1);
    assert_eq!(divider(0, 1), 1);
    assert_eq!(divider(9, 5), 50);
    assert_eq!(divider(4095, 0), 1);
    assert_eq!(divider(4095, 255), 4096 * 255);
}

#[test]
fn test_cfg0_write_recomputes_divider() {
    let mut timer = clocked_timer();

    timer.write(regs::CFG0, cfg0(9, 5)).unwrap();
    assert_eq!(timer.prescaler(), 9);
    assert_eq!(timer.step(), 5);
    assert_eq!(timer.divider(), 50);
    assert_eq!(timer.counter().divider(), 50);
    assert_eq!(timer.read(regs::CFG0).unwrap(), cfg0(9, 5));
}

#[test]
fn test_zero_step_clamps_divider() {
    let mut timer = clocked_timer();

    timer.write(regs::CFG0, cfg0(0, 0)).unwrap();
    assert_eq!(timer.divider(), 1);
    assert_eq!(timer.counter().divider(), 1);

    timer.write(regs::CFG0, cfg0(100, 0)).unwrap();
    assert_eq!(timer.divider(), 1);
}

#[test]
fn test_one_divider_update_per_write() {
    let (mut timer, fake) = fake_timer();
    fake.state.lock().unwrap().divider_writes.clear();

    // Both fields change in one access: exactly one recomputation
    timer.write(regs::CFG0, cfg0(3, 2)).unwrap();
    assert_eq!(fake.state.lock().unwrap().divider_writes, vec![8]);

    // A write that only changes the step field still recomputes once
    timer.write(regs::CFG0, cfg0(3, 4)).unwrap();
    assert_eq!(fake.state.lock().unwrap().divider_writes, vec![8, 16]);
}

#[test]
fn test_oversized_fields_are_truncated() {
    let mut timer = clocked_timer();

    // Bits 12-15 and 24-31 are reserved
    timer.write(regs::CFG0, 0xAB12_F003).unwrap();
    assert_eq!(timer.prescaler(), 0x003);
    assert_eq!(timer.step(), 0x12);
    assert_eq!(timer.divider(), 4 * 0x12);
}

#[test]
fn test_other_registers_do_not_touch_divider() {
    let (mut timer, fake) = fake_timer();
    fake.state.lock().unwrap().divider_writes.clear();

    timer.write(regs::CTRL, 1).unwrap();
    timer.write(regs::TIMER_V_LOWER0, 5).unwrap();
    timer.write(regs::INTR_ENABLE0, 1).unwrap();

    assert!(fake.state.lock().unwrap().divider_writes.is_empty());
}

#[test]
fn test_new_divider_applies_to_next_tick() {
    let mut timer = clocked_timer();
    timer.write(regs::CTRL, 1).unwrap();

    timer.write(regs::CFG0, cfg0(0, 10)).unwrap();
    timer.tick(25);
    assert_eq!(timer.counter().value(), 2);

    // No leftover cycles from the /10 rate survive the change
    timer.write(regs::CFG0, cfg0(1, 2)).unwrap();
    timer.tick(3);
    assert_eq!(timer.counter().value(), 2);
    timer.tick(1);
    assert_eq!(timer.counter().value(), 3);
}
