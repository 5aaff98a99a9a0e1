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

//! RISC-V Timer Peripheral Implementation
//!
//! A single-hart, single-timer `rv_timer`: a 64-bit free-running counter
//! with a programmable divider and a 64-bit compare threshold driving one
//! level-sensitive interrupt line.
//!
//! ## Register Layout
//!
//! ```text
//! 0x000  ALERT_TEST      W   reserved
//! 0x004  CTRL            RW  bit 0: counter active
//! 0x100  CFG0            RW  bits 11-0: prescale, bits 23-16: step
//! 0x104  TIMER_V_LOWER0  RW  counter bits 31-0
//! 0x108  TIMER_V_UPPER0  RW  counter bits 63-32
//! 0x10C  COMPARE_LOWER0  RW  compare bits 31-0  (reset 0xFFFFFFFF)
//! 0x110  COMPARE_UPPER0  RW  compare bits 63-32 (reset 0xFFFFFFFF)
//! 0x114  INTR_ENABLE0    RW  bit 0: interrupt enable
//! 0x118  INTR_STATE0     RW  bit 0: line level (writes only re-evaluate)
//! 0x11C  INTR_TEST0      W   bit 0: force line high
//! ```
//!
//! ## Divider
//!
//! The counter advances once every `(prescale + 1) * step` reference cycles.
//! A step of 0 would stop the clock; the divider is clamped to 1 instead.
//!
//! ## Interrupt
//!
//! ```text
//! line = (active && intr_enable && value >= compare) || test_forced
//! ```
//!
//! `test_forced` is set by writing 1 to INTR_TEST0 and is dropped by the next
//! write to CTRL, the value/compare halves or INTR_ENABLE0.

use crate::core::counter::VirtualCounter;
use crate::core::error::Result;
use crate::core::interrupt::IrqLine;
use crate::core::memory::IODevice;
use crate::core::register::{Access, FieldDescriptor, RegisterDescriptor, RegisterFile};
use crate::core::save_state::{StateSave, TimerSnapshot, TimerState};

mod shared;

#[cfg(test)]
mod tests;

pub use shared::SharedTimer;

/// Default base address (OpenTitan Earl Grey `rv_timer`)
pub const RV_TIMER_BASE: u32 = 0x4010_0000;

/// Addressable span of the register file in bytes
pub const RV_TIMER_SIZE: u32 = 0x120;

/// Highest base address whose register span still fits below 4 GiB
pub const RV_TIMER_MAX_BASE: u32 = u32::MAX - (RV_TIMER_SIZE - 1);

/// Register offsets
pub mod regs {
    pub const ALERT_TEST: u32 = 0x000;
    pub const CTRL: u32 = 0x004;
    pub const CFG0: u32 = 0x100;
    pub const TIMER_V_LOWER0: u32 = 0x104;
    pub const TIMER_V_UPPER0: u32 = 0x108;
    pub const COMPARE_LOWER0: u32 = 0x10C;
    pub const COMPARE_UPPER0: u32 = 0x110;
    pub const INTR_ENABLE0: u32 = 0x114;
    pub const INTR_STATE0: u32 = 0x118;
    pub const INTR_TEST0: u32 = 0x11C;
}

/// Prescaler field width (bits 11-0 of CFG0)
const PRESCALE_MASK: u16 = 0x0FFF;

/// Step value after reset
const RESET_STEP: u8 = 1;

/// Which 32-bit half of a 64-bit value an access targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Low,
    High,
}

impl Half {
    #[inline(always)]
    const fn shift(self) -> u32 {
        match self {
            Half::Low => 0,
            Half::High => 32,
        }
    }

    #[inline(always)]
    const fn mask(self) -> u64 {
        0xFFFF_FFFFu64 << self.shift()
    }

    /// Extract this half of `value`
    #[inline(always)]
    pub const fn read(self, value: u64) -> u32 {
        (value >> self.shift()) as u32
    }

    /// Replace this half of `old` with `half`, leaving the other half intact
    #[inline(always)]
    pub const fn write(self, old: u64, half: u32) -> u64 {
        (old & !self.mask()) | (((half as u64) << self.shift()) & self.mask())
    }
}

/// Compute the counter divider from the CFG0 fields
///
/// # Example
///
/// ```
/// use rvtimer::core::timer::divider;
///
/// assert_eq!(divider(9, 5), 50);
/// assert_eq!(divider(0, 0), 1);
/// ```
#[inline]
pub fn divider(prescaler: u16, step: u8) -> u32 {
    let product = (u32::from(prescaler) + 1) * u32::from(step);
    product.max(1)
}

/// RISC-V timer peripheral
pub struct RvTimer {
    /// Physical base address
    base_addr: u32,

    /// Counter collaborator (value, compare, active flag, tick rate)
    counter: Box<dyn VirtualCounter + Send>,

    /// CFG0 prescale field (12 bits)
    prescaler: u16,

    /// CFG0 step field (8 bits)
    step: u8,

    /// Derived divider, never 0
    divider: u32,

    /// INTR_ENABLE0 bit 0
    interrupt_enable: bool,

    /// Line forced high through INTR_TEST0
    test_forced: bool,

    /// Interrupt output
    irq: IrqLine,
}

impl RvTimer {
    /// Create a timer at the default base address
    ///
    /// # Example
    ///
    /// ```
    /// use rvtimer::core::counter::ClockedCounter;
    /// use rvtimer::core::timer::RvTimer;
    ///
    /// let timer = RvTimer::new(Box::new(ClockedCounter::new()));
    /// assert_eq!(timer.divider(), 1);
    /// assert!(!timer.irq().is_set());
    /// ```
    pub fn new(counter: Box<dyn VirtualCounter + Send>) -> Self {
        Self::with_base(RV_TIMER_BASE, counter)
    }

    /// Create a timer at `base_addr`
    pub fn with_base(base_addr: u32, counter: Box<dyn VirtualCounter + Send>) -> Self {
        let mut timer = Self {
            base_addr,
            counter,
            prescaler: 0,
            step: RESET_STEP,
            divider: 1,
            interrupt_enable: false,
            test_forced: false,
            irq: IrqLine::new("rv_timer"),
        };
        timer.reset();
        timer
    }

    /// Return every register to its reset value
    ///
    /// Resetting twice is the same as resetting once.
    pub fn reset(&mut self) {
        self.counter.reset();
        self.counter.set_value(0);
        self.counter.set_compare(u64::MAX);
        self.counter.set_enabled(false);

        self.prescaler = 0;
        self.step = RESET_STEP;
        self.interrupt_enable = false;
        self.test_forced = false;
        self.update_divider();
        self.update_interrupt();

        log::debug!("rv_timer reset (base 0x{:08X})", self.base_addr);
    }

    /// Read a register
    ///
    /// # Errors
    ///
    /// `UnmappedRegister` for offsets outside the register map.
    pub fn read(&self, offset: u32) -> Result<u32> {
        REGISTER_FILE.read(self, offset)
    }

    /// Write a register
    ///
    /// Divider and interrupt line are up to date when this returns.
    ///
    /// # Errors
    ///
    /// `UnmappedRegister` for offsets outside the register map.
    pub fn write(&mut self, offset: u32, value: u32) -> Result<()> {
        REGISTER_FILE.write(self, offset, value)
    }

    /// Advance the counter by `cycles` reference-clock cycles
    ///
    /// Delivers the compare-reached notification if the counter reports one.
    ///
    /// # Returns
    ///
    /// Interrupt line level after the advance
    pub fn tick(&mut self, cycles: u64) -> bool {
        if self.counter.advance(cycles) {
            self.on_compare_reached();
        }
        self.irq.is_set()
    }

    /// Compare-reached notification from the counter
    pub fn on_compare_reached(&mut self) {
        log::trace!(
            "rv_timer compare reached (value=0x{:016X})",
            self.counter.value()
        );
        self.update_interrupt();
    }

    /// Interrupt output line
    ///
    /// Clone it to hand the line to an interrupt consumer.
    #[inline(always)]
    pub fn irq(&self) -> &IrqLine {
        &self.irq
    }

    /// Current divider
    #[inline(always)]
    pub fn divider(&self) -> u32 {
        self.divider
    }

    /// CFG0 prescale field
    pub fn prescaler(&self) -> u16 {
        self.prescaler
    }

    /// CFG0 step field
    pub fn step(&self) -> u8 {
        self.step
    }

    /// INTR_ENABLE0 bit 0
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enable
    }

    /// Whether INTR_TEST0 is currently holding the line high
    pub fn test_forced(&self) -> bool {
        self.test_forced
    }

    /// Counter collaborator
    pub fn counter(&self) -> &dyn VirtualCounter {
        self.counter.as_ref()
    }

    /// Mutable counter collaborator
    ///
    /// Changes made here bypass the register file; call
    /// [`RvTimer::on_compare_reached`] afterwards to re-evaluate the line.
    pub fn counter_mut(&mut self) -> &mut dyn VirtualCounter {
        self.counter.as_mut()
    }

    /// Physical base address
    pub fn base_addr(&self) -> u32 {
        self.base_addr
    }

    /// Register descriptor table
    pub fn register_file() -> &'static RegisterFile<RvTimer> {
        &REGISTER_FILE
    }

    /// Capture the register-visible state
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(self.base_addr, self.to_state())
    }

    /// Restore a snapshot taken with [`RvTimer::snapshot`]
    ///
    /// The divider and the interrupt line are recomputed from the restored
    /// fields; the saved line level is informational.
    pub fn restore(&mut self, snapshot: &TimerSnapshot) {
        self.restore_from_state(&snapshot.timer);
    }

    fn update_divider(&mut self) {
        let divider = divider(self.prescaler, self.step);
        if self.step == 0 {
            log::trace!("rv_timer step is 0, divider clamped to 1");
        }

        if divider != self.divider {
            log::debug!(
                "rv_timer divider {} -> {} (prescale={}, step={})",
                self.divider,
                divider,
                self.prescaler,
                self.step
            );
        }

        self.divider = divider;
        self.counter.set_divider(divider);
    }

    fn update_interrupt(&mut self) {
        let matched = self.counter.enabled()
            && self.interrupt_enable
            && self.counter.value() >= self.counter.compare();

        self.irq.set(matched || self.test_forced);
    }

    /// Post-write hook of registers whose write is an explicit clearing condition
    fn clear_test_and_update(&mut self) {
        self.test_forced = false;
        self.update_interrupt();
    }

    fn set_value_half(&mut self, half: Half, value: u32) {
        let merged = half.write(self.counter.value(), value);
        self.counter.set_value(merged);
    }

    fn set_compare_half(&mut self, half: Half, value: u32) {
        let merged = half.write(self.counter.compare(), value);
        self.counter.set_compare(merged);
    }
}

impl StateSave for RvTimer {
    type State = TimerState;

    fn to_state(&self) -> TimerState {
        TimerState {
            value: self.counter.value(),
            compare: self.counter.compare(),
            active: self.counter.enabled(),
            prescaler: self.prescaler,
            step: self.step,
            interrupt_enable: self.interrupt_enable,
            test_forced: self.test_forced,
            line: self.irq.is_set(),
        }
    }

    fn restore_from_state(&mut self, state: &TimerState) {
        self.counter.set_value(state.value);
        self.counter.set_compare(state.compare);
        self.counter.set_enabled(state.active);
        self.prescaler = state.prescaler & PRESCALE_MASK;
        self.step = state.step;
        self.interrupt_enable = state.interrupt_enable;
        self.test_forced = state.test_forced;
        self.update_divider();
        self.update_interrupt();

        log::debug!(
            "rv_timer restored (value=0x{:016X}, divider={})",
            state.value,
            self.divider
        );
    }
}

impl IODevice for RvTimer {
    fn address_range(&self) -> (u32, u32) {
        // Clipped at the top of the address space
        (
            self.base_addr,
            self.base_addr.saturating_add(RV_TIMER_SIZE - 1),
        )
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        self.read(offset)
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        self.write(offset, value)
    }

    fn reset(&mut self) {
        RvTimer::reset(self);
    }

    fn name(&self) -> &str {
        "rv_timer"
    }
}

static REGISTERS: [RegisterDescriptor<RvTimer>; 10] = [
    RegisterDescriptor {
        offset: regs::ALERT_TEST,
        name: "ALERT_TEST",
        access: Access::WriteOnly,
        reset_value: 0,
        fields: &[],
        on_write: None,
    },
    RegisterDescriptor {
        offset: regs::CTRL,
        name: "CTRL",
        access: Access::ReadWrite,
        reset_value: 0,
        fields: &[FieldDescriptor {
            name: "active",
            lsb: 0,
            width: 1,
            read: Some(|t: &RvTimer| u32::from(t.counter.enabled())),
            write: Some(|t: &mut RvTimer, v| t.counter.set_enabled(v != 0)),
        }],
        on_write: Some(RvTimer::clear_test_and_update),
    },
    RegisterDescriptor {
        offset: regs::CFG0,
        name: "CFG0",
        access: Access::ReadWrite,
        reset_value: (RESET_STEP as u32) << 16,
        fields: &[
            FieldDescriptor {
                name: "prescale",
                lsb: 0,
                width: 12,
                read: Some(|t: &RvTimer| u32::from(t.prescaler)),
                write: Some(|t: &mut RvTimer, v| t.prescaler = v as u16 & PRESCALE_MASK),
            },
            FieldDescriptor {
                name: "step",
                lsb: 16,
                width: 8,
                read: Some(|t: &RvTimer| u32::from(t.step)),
                write: Some(|t: &mut RvTimer, v| t.step = v as u8),
            },
        ],
        on_write: Some(RvTimer::update_divider),
    },
    RegisterDescriptor {
        offset: regs::TIMER_V_LOWER0,
        name: "TIMER_V_LOWER0",
        access: Access::ReadWrite,
        reset_value: 0,
        fields: &[FieldDescriptor {
            name: "v",
            lsb: 0,
            width: 32,
            read: Some(|t: &RvTimer| Half::Low.read(t.counter.value())),
            write: Some(|t: &mut RvTimer, v| t.set_value_half(Half::Low, v)),
        }],
        on_write: Some(RvTimer::clear_test_and_update),
    },
    RegisterDescriptor {
        offset: regs::TIMER_V_UPPER0,
        name: "TIMER_V_UPPER0",
        access: Access::ReadWrite,
        reset_value: 0,
        fields: &[FieldDescriptor {
            name: "v",
            lsb: 0,
            width: 32,
            read: Some(|t: &RvTimer| Half::High.read(t.counter.value())),
            write: Some(|t: &mut RvTimer, v| t.set_value_half(Half::High, v)),
        }],
        on_write: Some(RvTimer::clear_test_and_update),
    },
    RegisterDescriptor {
        offset: regs::COMPARE_LOWER0,
        name: "COMPARE_LOWER0",
        access: Access::ReadWrite,
        reset_value: 0xFFFF_FFFF,
        fields: &[FieldDescriptor {
            name: "v",
            lsb: 0,
            width: 32,
            read: Some(|t: &RvTimer| Half::Low.read(t.counter.compare())),
            write: Some(|t: &mut RvTimer, v| t.set_compare_half(Half::Low, v)),
        }],
        on_write: Some(RvTimer::clear_test_and_update),
    },
    RegisterDescriptor {
        offset: regs::COMPARE_UPPER0,
        name: "COMPARE_UPPER0",
        access: Access::ReadWrite,
        reset_value: 0xFFFF_FFFF,
        fields: &[FieldDescriptor {
            name: "v",
            lsb: 0,
            width: 32,
            read: Some(|t: &RvTimer| Half::High.read(t.counter.compare())),
            write: Some(|t: &mut RvTimer, v| t.set_compare_half(Half::High, v)),
        }],
        on_write: Some(RvTimer::clear_test_and_update),
    },
    RegisterDescriptor {
        offset: regs::INTR_ENABLE0,
        name: "INTR_ENABLE0",
        access: Access::ReadWrite,
        reset_value: 0,
        fields: &[FieldDescriptor {
            name: "ie",
            lsb: 0,
            width: 1,
            read: Some(|t: &RvTimer| u32::from(t.interrupt_enable)),
            write: Some(|t: &mut RvTimer, v| t.interrupt_enable = v != 0),
        }],
        on_write: Some(RvTimer::clear_test_and_update),
    },
    RegisterDescriptor {
        offset: regs::INTR_STATE0,
        name: "INTR_STATE0",
        access: Access::ReadWrite,
        reset_value: 0,
        fields: &[FieldDescriptor {
            name: "is",
            lsb: 0,
            width: 1,
            read: Some(|t: &RvTimer| u32::from(t.irq.is_set())),
            write: None,
        }],
        on_write: Some(RvTimer::update_interrupt),
    },
    RegisterDescriptor {
        offset: regs::INTR_TEST0,
        name: "INTR_TEST0",
        access: Access::WriteOnly,
        reset_value: 0,
        fields: &[FieldDescriptor {
            name: "t",
            lsb: 0,
            width: 1,
            read: None,
            write: Some(|t: &mut RvTimer, v| {
                // Sticky: writing 0 never clears a forced line
                if v != 0 {
                    t.test_forced = true;
                }
            }),
        }],
        on_write: Some(RvTimer::update_interrupt),
    },
];

static REGISTER_FILE: RegisterFile<RvTimer> = RegisterFile::new(&REGISTERS, RV_TIMER_SIZE);
