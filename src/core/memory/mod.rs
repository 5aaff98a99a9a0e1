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

//! Memory-mapped I/O bus
//!
//! The Bus routes 32-bit physical accesses to registered [`IODevice`]s.
//! It is the minimal dispatch layer needed to drive peripherals from a
//! harness or a test; a full simulator supplies its own.
//!
//! # Example
//!
//! ```
//! use rvtimer::core::counter::ClockedCounter;
//! use rvtimer::core::memory::Bus;
//! use rvtimer::core::timer::RvTimer;
//!
//! let mut bus = Bus::new();
//! bus.register_device(Box::new(RvTimer::with_base(
//!     0x4010_0000,
//!     Box::new(ClockedCounter::new()),
//! )));
//!
//! bus.write32(0x4010_0104, 0x1234).unwrap();
//! assert_eq!(bus.read32(0x4010_0104).unwrap(), 0x1234);
//! assert!(bus.read32(0x5000_0000).is_err());
//! ```

use crate::core::error::{PeripheralError, Result};

mod io_device;

#[cfg(test)]
mod tests;

pub use io_device::IODevice;

/// Memory bus managing all device accesses
pub struct Bus {
    /// Registered devices, searched in registration order
    devices: Vec<Box<dyn IODevice + Send>>,
}

impl Bus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Attach a device at its declared address range
    pub fn register_device(&mut self, device: Box<dyn IODevice + Send>) {
        let (start, end) = device.address_range();
        log::debug!(
            "Bus: registered {} at 0x{:08X}-0x{:08X}",
            device.name(),
            start,
            end
        );
        self.devices.push(device);
    }

    /// Number of attached devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Read a 32-bit value
    ///
    /// # Errors
    ///
    /// `InvalidMemoryAccess` if no device claims the address; device errors
    /// (e.g. `UnmappedRegister`) are passed through.
    pub fn read32(&self, addr: u32) -> Result<u32> {
        let device = self
            .devices
            .iter()
            .find(|device| device.contains(addr))
            .ok_or(PeripheralError::InvalidMemoryAccess { address: addr })?;

        let (start, _) = device.address_range();
        device.read_register(addr - start)
    }

    /// Write a 32-bit value
    ///
    /// # Errors
    ///
    /// Same as [`Bus::read32`].
    pub fn write32(&mut self, addr: u32, value: u32) -> Result<()> {
        let device = self
            .devices
            .iter_mut()
            .find(|device| device.contains(addr))
            .ok_or(PeripheralError::InvalidMemoryAccess { address: addr })?;

        let (start, _) = device.address_range();
        device.write_register(addr - start, value)
    }

    /// Reset every attached device
    pub fn reset(&mut self) {
        for device in &mut self.devices {
            device.reset();
        }
        log::debug!("Bus: reset {} device(s)", self.devices.len());
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
