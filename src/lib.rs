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

//! RISC-V timer peripheral model
//!
//! This library provides a register-accurate `rv_timer` for instruction-set
//! simulators: a 64-bit counter with a programmable divider, a 64-bit
//! compare threshold and one level-sensitive interrupt line, exposed through
//! a 32-bit memory-mapped register file.
//!
//! # Example
//!
//! ```
//! use rvtimer::core::counter::ClockedCounter;
//! use rvtimer::core::timer::{regs, RvTimer};
//!
//! let mut timer = RvTimer::new(Box::new(ClockedCounter::new()));
//! timer.write(regs::COMPARE_LOWER0, 10).unwrap();
//! timer.write(regs::COMPARE_UPPER0, 0).unwrap();
//! timer.write(regs::INTR_ENABLE0, 1).unwrap();
//! timer.write(regs::CTRL, 1).unwrap();
//!
//! assert!(timer.tick(10));
//! assert!(timer.irq().is_set());
//! ```

pub mod core;
