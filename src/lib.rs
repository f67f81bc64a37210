// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! CONTEXT: bounded command-log daemon — ring buffer + assembler behind a
//! mutex-guarded device surface, multiplexed onto TCP clients
//!
//! OWNERS: @runtime
//!
//! STATUS: Experimental
//!
//! TEST_COVERAGE:
//!   - Unit tests colocated with `ring`, `assembler`, `device`, `wire`
//!   - End-to-end scenarios in `tests/e2e.rs`
//!
//! PUBLIC API:
//!   - `ring`: bounded in-memory command ring (drop-oldest)
//!   - `assembler`: newline-delimited command accumulation
//!   - `device`: mutex-guarded session-based surface over ring + assembler
//!   - `server`: TCP accept loop, per-session handling, timestamp injector

pub mod assembler;
pub mod cli;
pub mod device;
pub mod error;
pub mod ring;
pub mod server;
pub mod wire;
