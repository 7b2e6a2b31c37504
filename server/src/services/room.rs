//! Room membership and event routing.
//!
//! DESIGN
//! ======
//! A room is created lazily on first join and deleted when its last member
//! leaves. Fanout is per-member: each connection registered a bounded mpsc
//! sender at upgrade time, and broadcast uses `try_send` so one slow consumer
//! never stalls the rest of the room. Events routed to a room the sender is
//! not a member of (or to a room that no longer exists) are dropped silently
//! rather than erroring the connection.

use protocol::{DrawAction, RoomSnapshot, ServerEvent, User};
use rand::Rng;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::state::{AppState, Member, Room};

// =============================================================================
// COLOR ASSIGNMENT
// =============================================================================

/// Presence colors cycled through at random on join.
pub const PALETTE: [&str; 8] = [
    "#FF5733", "#33FF57", "#3357FF", "#FF33A8", "#33A8FF", "#A833FF", "#FF8333", "#33FFC1",
];

#[must_use]
pub fn random_color() -> String {
    let index = rand::rng().random_range(0..PALETTE.len());
    PALETTE[index].to_string()
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// Add `conn_id` to a room, creating the room if needed.
///
/// Returns the bootstrap snapshot the joiner should receive: the member list
/// (joiner included, join order) plus the retained action log. Everyone else
/// in the room is told about the new arrival.
pub async fn join(
    state: &AppState,
    room_id: &str,
    user_name: &str,
    conn_id: Uuid,
    tx: mpsc::Sender<ServerEvent>,
) -> RoomSnapshot {
    let mut rooms = state.rooms.write().await;
    let room = rooms.entry(room_id.to_string()).or_insert_with(Room::new);

    // A rejoin on the same connection replaces the stale entry instead of
    // duplicating it.
    if let Some(index) = room.member_index(conn_id) {
        room.members.remove(index);
    }

    let user = User {
        id: conn_id,
        name: user_name.to_string(),
        color: random_color(),
        cursor: None,
    };
    room.members.push(Member { user: user.clone(), tx });

    broadcast_except(room, conn_id, &ServerEvent::UserJoined(user));

    tracing::info!(room = room_id, name = user_name, members = room.members.len(), "user joined");

    RoomSnapshot { members: room.users(), actions: room.log.snapshot() }
}

/// Remove `conn_id` from every room it belongs to, announcing the departure
/// to remaining members and deleting rooms left empty.
pub async fn leave(state: &AppState, conn_id: Uuid) {
    let mut rooms = state.rooms.write().await;

    rooms.retain(|room_id, room| {
        let Some(index) = room.member_index(conn_id) else {
            return true;
        };
        let departed = room.members.remove(index);
        broadcast_except(
            room,
            conn_id,
            &ServerEvent::UserLeft { id: departed.user.id, name: departed.user.name.clone() },
        );
        tracing::info!(room = room_id.as_str(), name = departed.user.name, "user left");
        !room.members.is_empty()
    });
}

/// Live rooms as `(room_id, member_count)` pairs.
pub async fn list(state: &AppState) -> Vec<(String, usize)> {
    let rooms = state.rooms.read().await;
    rooms.iter().map(|(id, room)| (id.clone(), room.members.len())).collect()
}

// =============================================================================
// EVENT ROUTING
// =============================================================================

/// Record a draw action and fan it out to everyone else in the room.
///
/// The author id is overwritten with the sender's connection id, so a client
/// cannot attribute actions to someone else. Actions aimed at a room the
/// sender is not in are dropped.
pub async fn route_action(state: &AppState, room_id: &str, conn_id: Uuid, mut action: DrawAction) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(room_id) else {
        tracing::debug!(room = room_id, "action for unknown room dropped");
        return;
    };
    if room.member_index(conn_id).is_none() {
        tracing::debug!(room = room_id, "action from non-member dropped");
        return;
    }

    action.user_id = conn_id;
    room.log.append(action.clone());
    broadcast_except(room, conn_id, &ServerEvent::DrawAction(action));
}

/// Update the sender's cursor position and relay it to the rest of the room.
pub async fn route_cursor(state: &AppState, room_id: &str, conn_id: Uuid, x: f64, y: f64) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(room_id) else {
        return;
    };
    let Some(index) = room.member_index(conn_id) else {
        return;
    };

    room.members[index].user.cursor = Some(protocol::Point { x, y });
    broadcast_except(room, conn_id, &ServerEvent::CursorMove { user_id: conn_id, x, y });
}

// =============================================================================
// FANOUT
// =============================================================================

/// Best-effort fanout to every member except `skip`. A full or closed channel
/// drops the event for that member only.
fn broadcast_except(room: &Room, skip: Uuid, event: &ServerEvent) {
    for member in &room.members {
        if member.user.id == skip {
            continue;
        }
        if member.tx.try_send(event.clone()).is_err() {
            tracing::warn!(user = %member.user.id, "fanout channel full or closed, dropping event");
        }
    }
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
