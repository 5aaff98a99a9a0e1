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

//! Declarative register files
//!
//! A peripheral describes its registers as a static table of
//! [`RegisterDescriptor`]s. The generic [`RegisterFile`] routine decodes a bus
//! offset against that table and dispatches field-level reads and writes to
//! plain function pointers on the device.
//!
//! ## Decode Rules
//!
//! ```text
//! offset unaligned / out of span / no descriptor -> UnmappedRegister
//! read  of write-only register                   -> 0
//! write of read-only register                    -> ignored
//! bits not covered by any field                  -> read 0, writes dropped
//! field value                                    -> masked to field width
//! ```
//!
//! After all field write effects of one access have run, the register's
//! `on_write` hook runs exactly once.

use crate::core::error::{AccessKind, PeripheralError, Result};


/// Register access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    #[inline(always)]
    pub fn readable(self) -> bool {
        matches!(self, Access::ReadOnly | Access::ReadWrite)
    }

    #[inline(always)]
    pub fn writable(self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }
}

/// One bit-field inside a 32-bit register
pub struct FieldDescriptor<T: 'static> {
    /// Field name (for tracing)
    pub name: &'static str,

    /// Bit position of the least significant bit
    pub lsb: u8,

    /// Width in bits (1-32)
    pub width: u8,

    /// Value provider, invoked on read. `None` reads as zero.
    pub read: Option<fn(&T) -> u32>,

    /// Write effect, invoked with the masked field value. `None` drops writes.
    pub write: Option<fn(&mut T, u32)>,
}

impl<T: 'static> FieldDescriptor<T> {
    /// Field mask in field-relative position (not shifted)
    #[inline(always)]
    pub const fn value_mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Field mask in register position
    #[inline(always)]
    pub const fn register_mask(&self) -> u32 {
        self.value_mask() << self.lsb
    }

    /// Extract this field from a raw register value
    #[inline(always)]
    pub const fn extract(&self, raw: u32) -> u32 {
        (raw >> self.lsb) & self.value_mask()
    }

    /// Place a field value into register position, truncating to the width
    #[inline(always)]
    pub const fn insert(&self, value: u32) -> u32 {
        (value & self.value_mask()) << self.lsb
    }
}

/// One 32-bit register
pub struct RegisterDescriptor<T: 'static> {
    /// Offset from the peripheral base (word aligned)
    pub offset: u32,

    /// Register name (for tracing)
    pub name: &'static str,

    /// Access mode
    pub access: Access,

    /// Value the register reads back after reset
    pub reset_value: u32,

    /// Bit-field layout, ordered by `lsb`
    pub fields: &'static [FieldDescriptor<T>],

    /// Register-level effect run once after all field writes of an access
    pub on_write: Option<fn(&mut T)>,
}

impl<T: 'static> RegisterDescriptor<T> {
    /// Bits not covered by any field
    pub fn reserved_mask(&self) -> u32 {
        !self
            .fields
            .iter()
            .fold(0u32, |acc, field| acc | field.register_mask())
    }
}

/// Generic decode routine over a static descriptor table
pub struct RegisterFile<T: 'static> {
    registers: &'static [RegisterDescriptor<T>],
    size: u32,
}

impl<T: 'static> RegisterFile<T> {
    /// Create a register file spanning `size` bytes
    ///
    /// `registers` must be ordered by ascending offset.
    pub const fn new(registers: &'static [RegisterDescriptor<T>], size: u32) -> Self {
        Self { registers, size }
    }

    /// Addressable span in bytes
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// All register descriptors, in offset order
    pub fn registers(&self) -> &'static [RegisterDescriptor<T>] {
        self.registers
    }

    /// Find the descriptor for an offset
    ///
    /// # Errors
    ///
    /// Returns `UnmappedRegister` if the offset is unaligned, outside the
    /// span, or names no register.
    pub fn lookup(
        &self,
        offset: u32,
        access: AccessKind,
    ) -> Result<&'static RegisterDescriptor<T>> {
        let unmapped = PeripheralError::UnmappedRegister { offset, access };

        if offset & 0x03 != 0 || offset >= self.size {
            return Err(unmapped);
        }

        let registers = self.registers;
        registers
            .binary_search_by_key(&offset, |reg| reg.offset)
            .map(|index| &registers[index])
            .map_err(|_| unmapped)
    }

    /// Read a register
    ///
    /// Assembles the register value from each field's value provider.
    /// Reserved bits and write-only registers read as zero.
    pub fn read(&self, device: &T, offset: u32) -> Result<u32> {
        let reg = self.lookup(offset, AccessKind::Read)?;

        if !reg.access.readable() {
            log::trace!("read of write-only register {} ignored", reg.name);
            return Ok(0);
        }

        let value = reg.fields.iter().fold(0u32, |acc, field| match field.read {
            Some(read) => acc | field.insert(read(device)),
            None => acc,
        });

        log::trace!("{} (0x{:03X}) -> 0x{:08X}", reg.name, offset, value);
        Ok(value)
    }

    /// Write a register
    ///
    /// Each field receives its masked slice of `value`, then the register's
    /// `on_write` hook runs once.
    pub fn write(&self, device: &mut T, offset: u32, value: u32) -> Result<()> {
        let reg = self.lookup(offset, AccessKind::Write)?;

        if !reg.access.writable() {
            log::trace!("write to read-only register {} ignored", reg.name);
            return Ok(());
        }

        log::trace!("{} (0x{:03X}) <- 0x{:08X}", reg.name, offset, value);

        for field in reg.fields {
            if let Some(write) = field.write {
                write(device, field.extract(value));
            }
        }

        if let Some(on_write) = reg.on_write {
            on_write(device);
        }

        Ok(())
    }

    /// Check the table for layout errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut previous: Option<u32> = None;

        for reg in self.registers {
            if reg.offset & 0x03 != 0 {
                return Err(format!(
                    "{}: unaligned offset 0x{:03X}",
                    reg.name, reg.offset
                ));
            }
            if reg.offset >= self.size {
                return Err(format!(
                    "{}: offset 0x{:03X} outside span",
                    reg.name, reg.offset
                ));
            }
            if previous.is_some_and(|prev| prev >= reg.offset) {
                return Err(format!("{}: offsets not ascending", reg.name));
            }
            previous = Some(reg.offset);

            let mut used = 0u32;
            for field in reg.fields {
                if field.width == 0 || u32::from(field.lsb) + u32::from(field.width) > 32 {
                    return Err(format!("{}.{}: field out of range", reg.name, field.name));
                }
                if used & field.register_mask() != 0 {
                    return Err(format!("{}.{}: overlapping field", reg.name, field.name));
                }
                used |= field.register_mask();
            }
        }

        Ok(())
    }
}
