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

/// Peripheral error types
use std::fmt;
use thiserror::Error;

/// Result type for peripheral operations
pub type Result<T> = std::result::Result<T, PeripheralError>;

/// Direction of a register access, carried by access faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => f.write_str("read"),
            AccessKind::Write => f.write_str("write"),
        }
    }
}

/// Main error type for the peripheral model
#[derive(Error, Debug)]
pub enum PeripheralError {
    #[error("Unmapped register: {access} at offset 0x{offset:03X}")]
    UnmappedRegister { offset: u32, access: AccessKind },

    #[error("Invalid memory access at 0x{address:08X}")]
    InvalidMemoryAccess { address: u32 },

    #[error("Peripheral lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<bincode::error::EncodeError> for PeripheralError {
    fn from(e: bincode::error::EncodeError) -> Self {
        PeripheralError::Snapshot(e.to_string())
    }
}

impl From<bincode::error::DecodeError> for PeripheralError {
    fn from(e: bincode::error::DecodeError) -> Self {
        PeripheralError::Snapshot(e.to_string())
    }
}
