//! Client-side view of who is in the room.
//!
//! The roster mirrors the server's membership as presence events arrive. The
//! bootstrap action log delivered with `room-state` is stored but not
//! replayed automatically; the embedding UI decides when (and whether) to
//! paint history onto a fresh surface.

use protocol::{DrawAction, Point, RoomSnapshot, User};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct RoomRoster {
    members: Vec<User>,
    bootstrap_actions: Vec<DrawAction>,
}

impl RoomRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole roster from a `room-state` bootstrap.
    pub fn reset(&mut self, snapshot: RoomSnapshot) {
        self.members = snapshot.members;
        self.bootstrap_actions = snapshot.actions;
    }

    /// Record a join, replacing any stale entry with the same id.
    pub fn add(&mut self, user: User) {
        if let Some(existing) = self.members.iter_mut().find(|m| m.id == user.id) {
            *existing = user;
        } else {
            self.members.push(user);
        }
    }

    /// Record a departure. Unknown ids are ignored.
    pub fn remove(&mut self, id: Uuid) -> Option<User> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    /// Update a member's cursor. Unknown ids are ignored.
    pub fn set_cursor(&mut self, id: Uuid, x: f64, y: f64) {
        if let Some(member) = self.members.iter_mut().find(|m| m.id == id) {
            member.cursor = Some(Point { x, y });
        }
    }

    /// Members in join order.
    #[must_use]
    pub fn members(&self) -> &[User] {
        &self.members
    }

    #[must_use]
    pub fn member(&self, id: Uuid) -> Option<&User> {
        self.members.iter().find(|m| m.id == id)
    }

    /// The retained action log from the last bootstrap, oldest first.
    #[must_use]
    pub fn bootstrap_actions(&self) -> &[DrawAction] {
        &self.bootstrap_actions
    }

    /// Hand the bootstrap log to the caller for replay, leaving it empty.
    pub fn take_bootstrap_actions(&mut self) -> Vec<DrawAction> {
        std::mem::take(&mut self.bootstrap_actions)
    }
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
