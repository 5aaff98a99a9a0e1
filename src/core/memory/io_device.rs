// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! I/O Device Trait
//!
//! This module defines the trait-based abstraction for memory-mapped I/O
//! devices. By implementing `IODevice`, a peripheral can be registered with
//! a [`Bus`](super::Bus) without the bus knowing the device type.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Memory Bus                     │
//! ├─────────────────────────────────────────────┤
//! │  Devices: Vec<Box<dyn IODevice>>            │
//! │                                             │
//! │  read32(addr) {                             │
//! │    for device in devices {                  │
//! │      if device.contains(addr) {             │
//! │        return device.read_register(offset)  │
//! │      }                                      │
//! │    }                                        │
//! │  }                                          │
//! └─────────────────────────────────────────────┘
//!                      ▲
//!                      │
//!               ┌──────┴──────┐
//!               │  RvTimer    │
//!               │ (IODevice)  │
//!               └─────────────┘
//! ```
//!
//! Only 32-bit accesses are modelled.

use crate::core::error::Result;

/// Trait for memory-mapped I/O devices
///
/// # Address Translation
///
/// The Bus translates physical addresses to device-relative offsets before
/// calling trait methods. For a timer at `0x40100000`, an access to
/// `0x40100104` reaches the device as offset `0x104`.
pub trait IODevice {
    /// Get the address range this device responds to
    ///
    /// Returns `(start, end)`, both inclusive.
    fn address_range(&self) -> (u32, u32);

    /// Check if this device contains the given address
    fn contains(&self, addr: u32) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read a 32-bit value from a device register
    ///
    /// # Errors
    ///
    /// Returns an error if the offset names no register of this device.
    fn read_register(&self, offset: u32) -> Result<u32>;

    /// Write a 32-bit value to a device register
    ///
    /// # Errors
    ///
    /// Returns an error if the offset names no register of this device.
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;

    /// Return the device to its power-on state
    fn reset(&mut self) {}

    /// Device name for debugging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}
