//! Shared wire model for the realtime drawing protocol.
//!
//! This crate owns the types that cross the websocket boundary between
//! `server` and `client`: drawing actions, room presence, and the two event
//! unions. Both unions are internally tagged (`event` + `data`), so each side
//! of the connection dispatches on one typed enum in one place instead of
//! registering per-event callbacks.
//!
//! Everything here is plain data. Transport, routing, and painting live in
//! the `server`, `client`, and `surface` crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned by [`decode_client_event`] and [`decode_server_event`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text frame was not valid JSON or did not match any known event.
    #[error("failed to decode event: {0}")]
    Decode(#[from] serde_json::Error),
}

// =============================================================================
// DRAWING ACTIONS
// =============================================================================

/// A single point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The kind of a drawing action.
///
/// `Undo` and `Redo` are part of the wire vocabulary but the sync agent never
/// emits them; undo/redo remain local to each participant's history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Draw,
    Erase,
    Clear,
    Undo,
    Redo,
}

/// One discrete recorded drawing operation, replayable on any surface.
///
/// Immutable once created: the sender stamps `user_id` and `timestamp` and
/// the action is never mutated after it enters a room's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Stroke path in order. Absent for `clear`, `undo`, and `redo`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    /// CSS hex color, e.g. `"#FF5733"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Brush diameter in surface pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Tool identifier chosen by the sender's UI (opaque to the protocol).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Layer identifier (opaque to the protocol).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    /// Connection id of the author. Stamped by the sending agent.
    pub user_id: Uuid,
    /// Sender-local clock, milliseconds since the Unix epoch. Not globally
    /// comparable across authors.
    pub timestamp: i64,
}

/// A drawing action as produced by local input, before the agent stamps
/// authorship. Mirrors [`DrawAction`] minus `user_id` and `timestamp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawActionDraft {
    #[serde(rename = "type")]
    pub kind: Option<ActionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

impl DrawActionDraft {
    /// Build a draft for a stroke with the given kind and path.
    #[must_use]
    pub fn stroke(kind: ActionKind, points: Vec<Point>) -> Self {
        Self { kind: Some(kind), points: Some(points), ..Self::default() }
    }

    /// Stamp authorship and clock onto the draft, producing the final action.
    /// A draft without an explicit kind becomes a `draw`.
    #[must_use]
    pub fn into_action(self, user_id: Uuid, timestamp: i64) -> DrawAction {
        DrawAction {
            kind: self.kind.unwrap_or(ActionKind::Draw),
            points: self.points,
            color: self.color,
            size: self.size,
            tool: self.tool,
            layer_id: self.layer_id,
            user_id,
            timestamp,
        }
    }
}

// =============================================================================
// PRESENCE
// =============================================================================

/// A participant as seen by everyone in the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Opaque connection identifier assigned by the gateway.
    pub id: Uuid,
    pub name: String,
    /// Presence color assigned from the server palette on join.
    pub color: String,
    /// Last known cursor position, if the user has moved their pointer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Point>,
}

/// Bootstrap payload delivered to a joining connection only: the room's
/// current members in join order plus the retained action log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub members: Vec<User>,
    pub actions: Vec<DrawAction>,
}

// =============================================================================
// EVENT UNIONS
// =============================================================================

/// Events a client sends to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join (and create, if unknown) a room.
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "userName")]
        user_name: String,
    },
    /// A completed drawing action, fire-and-forget.
    DrawAction {
        #[serde(rename = "roomId")]
        room_id: String,
        action: DrawAction,
    },
    /// Ephemeral pointer position. Never logged server-side.
    CursorMove {
        #[serde(rename = "roomId")]
        room_id: String,
        x: f64,
        y: f64,
    },
}

/// Events the gateway sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Transport hello carrying the connection id the agent will stamp onto
    /// its outgoing actions. Sent once, immediately after upgrade.
    Connected { id: Uuid },
    /// Bootstrap snapshot, sent to the joining connection only.
    RoomState(RoomSnapshot),
    /// Presence: another user joined the room.
    UserJoined(User),
    /// Presence: a user left (or disconnected).
    UserLeft { id: Uuid, name: String },
    /// A remote drawing action to apply in arrival order.
    DrawAction(DrawAction),
    /// A remote cursor position update.
    CursorMove {
        #[serde(rename = "userId")]
        user_id: Uuid,
        x: f64,
        y: f64,
    },
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode any serializable event as a JSON text frame.
///
/// # Panics
///
/// Never panics in practice: every event type in this crate serializes
/// infallibly (no non-string map keys, no fallible `Serialize` impls).
#[must_use]
pub fn encode<T: Serialize>(event: &T) -> String {
    serde_json::to_string(event).unwrap_or_default()
}

/// Decode a JSON text frame into a client event.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON or unknown events.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a JSON text frame into a server event.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON or unknown events.
pub fn decode_server_event(text: &str) -> Result<ServerEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
