// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: error taxonomy shared by the device surface and the network frontend
//! STATUS: Experimental

use thiserror::Error;

/// Errors returned by [`crate::device::DeviceSurface`] operations.
///
/// The device surface never panics; every failure mode a caller can observe
/// is one of these variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("seek target out of range")]
    Invalid,
    #[error("allocation failure in assembler or ring")]
    Oom,
    #[error("operation interrupted before completion")]
    Interrupted,
    #[error("I/O boundary fault")]
    Fault,
}

/// Read outcome distinguishing end-of-stream from a hard error.
pub type ReadResult<T> = Result<T, DeviceError>;

/// Errors that terminate the network front end rather than a single session.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("transient accept error, retrying: {0}")]
    Transient(#[source] std::io::Error),
    #[error("fatal network error: {0}")]
    Fatal(#[source] std::io::Error),
}
