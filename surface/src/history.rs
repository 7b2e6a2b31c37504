//! Bounded, branch-discarding undo/redo history.
//!
//! DESIGN
//! ======
//! A history stack is an ordered sequence of full-surface snapshots plus a
//! cursor. `push` truncates everything beyond the cursor (a fresh edit
//! discards any redo branch), appends, and evicts the oldest entry once the
//! capacity is exceeded, re-basing the cursor accordingly. `undo` and `redo`
//! only move the cursor; restoring onto a surface is the caller's job so the
//! stack itself stays free of painting concerns.
//!
//! INVARIANTS
//! ==========
//! - The stack is never empty; the cursor always indexes a valid entry.
//! - `len() <= capacity` at all times.
//! - After `push`, the cursor is the last index and no redo entries exist.

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use std::collections::VecDeque;

use crate::consts::HISTORY_CAPACITY;
use crate::raster::Snapshot;

/// Per-surface undo/redo buffer. Local-only, never transmitted.
#[derive(Debug)]
pub struct HistoryStack {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    capacity: usize,
}

impl HistoryStack {
    /// Create a stack seeded with the initial (blank) surface state.
    #[must_use]
    pub fn new(initial: Snapshot) -> Self {
        Self::with_capacity(initial, HISTORY_CAPACITY)
    }

    /// Create a stack with an explicit capacity. Capacity below 1 is clamped.
    #[must_use]
    pub fn with_capacity(initial: Snapshot, capacity: usize) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1));
        entries.push_back(initial);
        Self { entries, cursor: 0, capacity: capacity.max(1) }
    }

    /// Record a completed edit. Discards the redo branch, appends, and
    /// evicts from the head once over capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry. Returns the snapshot to restore, or `None` when
    /// already at the oldest entry (no state change).
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry. Returns the snapshot to restore, or `None`
    /// when already at the newest entry (no state change).
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    /// The snapshot the cursor currently points at.
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        // The stack always holds at least the seed entry.
        false
    }

    #[must_use]
    pub fn cursor_index(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}
