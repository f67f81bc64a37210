// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: accumulates per-writer byte chunks into newline-terminated commands

use crate::error::DeviceError;
use crate::ring::Entry;

/// Working-buffer bound above which `append` returns `DeviceError::Oom`
/// instead of growing further. The reference source never bounds this; we
/// document a generous default per the spec's open question.
pub const DEFAULT_MAX_WORKING_BYTES: usize = 64 * 1024;

/// Accumulates write chunks into one working buffer and emits the *entire*
/// buffer as a single [`Entry`] the first time a newline appears anywhere in
/// it — including any bytes that arrived after the newline in the same
/// chunk. This is deliberate: see the module-level note in `device.rs`.
pub struct CommandAssembler {
    working: Vec<u8>,
    max_working_bytes: usize,
}

impl CommandAssembler {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_WORKING_BYTES)
    }

    pub fn with_limit(max_working_bytes: usize) -> Self {
        Self { working: Vec::new(), max_working_bytes }
    }

    /// Appends `chunk` to the working buffer. If a newline now appears
    /// anywhere in the buffer, returns the completed entry and resets to
    /// empty; otherwise returns `None` and retains the bytes.
    ///
    /// On `Oom` the working buffer is left exactly as it was before the call.
    pub fn append(&mut self, chunk: &[u8]) -> Result<Option<Entry>, DeviceError> {
        if self.working.len().saturating_add(chunk.len()) > self.max_working_bytes {
            return Err(DeviceError::Oom);
        }
        self.working.extend_from_slice(chunk);
        if self.working.contains(&b'\n') {
            let emitted = std::mem::take(&mut self.working);
            return Ok(Some(Entry::new(emitted)));
        }
        Ok(None)
    }
}

impl Default for CommandAssembler {
    fn default() -> Self {
        Self::new()
    }
}
