//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! owns the room registry: a map from room id to live room state (members
//! plus the bounded action log). A room exists iff it currently has at least
//! one member — rooms materialize on first join and are deleted the moment
//! their member list empties. Nothing here touches disk; the registry is the
//! only server-side store.
//!
//! Mutual exclusion is the registry lock: every gateway handler section runs
//! to completion under it, so no two handlers for the same room ever
//! interleave partially.

use std::collections::HashMap;
use std::sync::Arc;

use protocol::{ServerEvent, User};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::action_log::ActionLog;

// =============================================================================
// ROOM
// =============================================================================

/// One connected participant: presence data plus the sender used to fan
/// events out to that connection.
pub struct Member {
    pub user: User,
    pub tx: mpsc::Sender<ServerEvent>,
}

/// Per-room live state. Member order is join order.
pub struct Room {
    pub members: Vec<Member>,
    pub log: ActionLog,
}

impl Room {
    #[must_use]
    pub fn new() -> Self {
        Self { members: Vec::new(), log: ActionLog::new() }
    }

    /// Index of the member owning `conn_id`, if present.
    #[must_use]
    pub fn member_index(&self, conn_id: Uuid) -> Option<usize> {
        self.members.iter().position(|m| m.user.id == conn_id)
    }

    /// Current members in join order, presence data only.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.members.iter().map(|m| m.user.clone()).collect()
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — the registry is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, Room>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
