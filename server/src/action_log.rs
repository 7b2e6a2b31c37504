//! Bounded per-room action log.
//!
//! Every accepted draw action is appended here before fanout, so late joiners
//! can replay the recent history of a room. The log is a fixed-capacity FIFO:
//! once it holds `ACTION_LOG_CAPACITY` entries, each append evicts the oldest
//! entry first. Older actions are gone for good — the server keeps no other
//! record of them.

use std::collections::VecDeque;

use protocol::DrawAction;

/// Maximum retained actions per room.
pub const ACTION_LOG_CAPACITY: usize = 1000;

pub struct ActionLog {
    entries: VecDeque<DrawAction>,
    capacity: usize,
}

impl ActionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(ACTION_LOG_CAPACITY)
    }

    /// Smaller capacities keep eviction testable without 1000 appends.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity.min(64)), capacity: capacity.max(1) }
    }

    /// Append an action, evicting the oldest entry when full.
    pub fn append(&mut self, action: DrawAction) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(action);
    }

    /// All retained actions, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DrawAction> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "action_log_test.rs"]
mod tests;
