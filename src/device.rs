// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: mutex-guarded device surface unifying the ring and the assembler
//!
//! Exposes an open/release/read/write/seek contract modeled on the character
//! device this system stands in for. Every public operation here acquires
//! the single lock and releases it on every exit path, including early
//! returns on allocation failure — see the module notes in `ring.rs` and
//! `assembler.rs` for the pieces it composes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::assembler::CommandAssembler;
use crate::error::DeviceError;
use crate::ring::CircularLog;

/// Handle identifying one open session against the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Anchor for an explicit `seek` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekAnchor {
    Start,
    Current,
    End,
}

struct Inner {
    log: CircularLog,
    assembler: CommandAssembler,
    cursors: HashMap<SessionId, usize>,
}

/// Shared, mutex-guarded log + assembler + per-session cursors.
///
/// Cheap to clone: internally an `Arc`-free single instance is expected to be
/// wrapped in `std::sync::Arc` by callers that need to share it across
/// worker threads (see `server.rs`).
pub struct DeviceSurface {
    inner: Mutex<Inner>,
    next_session: AtomicU64,
}

impl DeviceSurface {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                log: CircularLog::new(capacity),
                assembler: CommandAssembler::new(),
                cursors: HashMap::new(),
            }),
            next_session: AtomicU64::new(1),
        }
    }

    /// Opens a fresh session with cursor 0.
    pub fn open(&self) -> SessionId {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        self.inner.lock().cursors.insert(id, 0);
        id
    }

    /// Discards a session. Never touches the shared log.
    pub fn release(&self, session: SessionId) {
        self.inner.lock().cursors.remove(&session);
    }

    /// Reads up to `n` bytes starting at the session cursor. Never crosses an
    /// entry boundary in one call; returns `Ok(Vec::new())` at end of stream.
    pub fn read(&self, session: SessionId, n: usize) -> Result<Vec<u8>, DeviceError> {
        let mut guard = self.inner.lock();
        let cursor = *guard.cursors.get(&session).ok_or(DeviceError::Fault)?;
        let Some(resolved) = guard.log.resolve(cursor) else {
            return Ok(Vec::new());
        };
        let entry = guard
            .log
            .entry_at(resolved.entry_index)
            .expect("resolve returned a live index");
        let avail = entry.len() - resolved.intra_offset;
        let k = n.min(avail);
        let out = entry.as_slice()[resolved.intra_offset..resolved.intra_offset + k].to_vec();
        guard.cursors.insert(session, cursor + k);
        Ok(out)
    }

    /// Reads the remainder of the log from the session cursor to end, in
    /// chunks of `chunk_size`, concatenated into one buffer. A convenience
    /// wrapper over repeated `read` calls for whole-log drains.
    pub fn read_to_end(&self, session: SessionId, chunk_size: usize) -> Result<Vec<u8>, DeviceError> {
        let mut out = Vec::new();
        loop {
            let chunk = self.read(session, chunk_size)?;
            if chunk.is_empty() {
                break;
            }
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    /// Appends `chunk` through the assembler; if a command boundary is
    /// crossed, pushes the completed entry into the ring (evicting the
    /// oldest if full). Returns the number of bytes accepted.
    pub fn write(&self, chunk: &[u8]) -> Result<usize, DeviceError> {
        let mut guard = self.inner.lock();
        if let Some(entry) = guard.assembler.append(chunk)? {
            guard.log.push(entry);
        }
        Ok(chunk.len())
    }

    /// Repositions the session cursor relative to `anchor`.
    pub fn seek(
        &self,
        session: SessionId,
        offset: i64,
        anchor: SeekAnchor,
    ) -> Result<usize, DeviceError> {
        let mut guard = self.inner.lock();
        let cursor = *guard.cursors.get(&session).ok_or(DeviceError::Fault)?;
        let base = match anchor {
            SeekAnchor::Start => 0i64,
            SeekAnchor::Current => cursor as i64,
            SeekAnchor::End => guard.log.total_size() as i64,
        };
        let new_pos = base + offset;
        if new_pos < 0 {
            return Err(DeviceError::Invalid);
        }
        let new_pos = new_pos as usize;
        guard.cursors.insert(session, new_pos);
        Ok(new_pos)
    }

    /// Repositions the session cursor to command `k`, byte offset `off`
    /// within it, counted from the oldest live entry.
    pub fn seek_to_command(&self, session: SessionId, k: usize, off: usize) -> Result<usize, DeviceError> {
        let mut guard = self.inner.lock();
        let new_pos = guard.log.seek_to_command(k, off).ok_or(DeviceError::Invalid)?;
        guard.cursors.insert(session, new_pos);
        Ok(new_pos)
    }
}
