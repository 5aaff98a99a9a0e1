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

//! Core peripheral components
//!
//! This module contains the timer model and what it plugs into:
//! - Register descriptor tables
//! - Virtual counter
//! - Interrupt line
//! - Memory bus
//! - Snapshots and harness configuration

pub mod config;
pub mod counter;
pub mod error;
pub mod interrupt;
pub mod memory;
pub mod register;
pub mod save_state;
pub mod timer;

// Re-export commonly used types
pub use config::SimConfig;
pub use counter::{ClockedCounter, VirtualCounter};
pub use error::{PeripheralError, Result};
pub use interrupt::IrqLine;
pub use memory::{Bus, IODevice};
pub use save_state::TimerSnapshot;
pub use timer::{RvTimer, SharedTimer};
