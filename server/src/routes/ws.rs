//! Websocket gateway — the realtime edge of the server.
//!
//! DESIGN
//! ======
//! On upgrade, the gateway mints a connection id, sends the `connected` hello,
//! and enters a `select!` loop:
//! - Inbound text frames → decode + dispatch to the room service
//! - Events fanned out by room peers → forward to this socket
//!
//! `process_event` is pure with respect to the socket: it mutates room state
//! and returns the events owed to the sender, so dispatch can be tested
//! without a live connection.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `connected` with the connection id
//! 2. Client joins a room → `room-state` bootstrap back, `user-joined` to peers
//! 3. Draw/cursor events → routed to the room, never echoed to the sender
//! 4. Close (or error) → membership removed, `user-left` to peers

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use protocol::{ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

/// Fanout buffer per connection. A member that falls this far behind starts
/// losing events rather than stalling the room.
const OUTBOUND_BUFFER: usize = 256;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);

    if send_event(&mut socket, &ServerEvent::Connected { id: conn_id }).await.is_err() {
        return;
    }
    info!(%conn_id, "ws: client connected");

    // The room this connection is currently joined to, if any.
    let mut current_room: Option<String> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies =
                            process_event(&state, &mut current_room, conn_id, &client_tx, &text)
                                .await;
                        for event in replies {
                            let _ = send_event(&mut socket, &event).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    // Peers are told before the membership record disappears.
    services::room::leave(&state, conn_id).await;
    info!(%conn_id, "ws: client disconnected");
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Decode one inbound text frame, route it, and return events owed to the
/// sender. Malformed frames are absorbed: the connection stays open and
/// nothing is echoed back.
async fn process_event(
    state: &AppState,
    current_room: &mut Option<String>,
    conn_id: Uuid,
    client_tx: &mpsc::Sender<ServerEvent>,
    text: &str,
) -> Vec<ServerEvent> {
    let event = match protocol::decode_client_event(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%conn_id, error = %e, "ws: malformed frame dropped");
            return vec![];
        }
    };

    match event {
        ClientEvent::JoinRoom { room_id, user_name } => {
            // Joining a second room implicitly leaves the first.
            if current_room.as_deref().is_some_and(|joined| joined != room_id) {
                services::room::leave(state, conn_id).await;
            }

            let snapshot =
                services::room::join(state, &room_id, &user_name, conn_id, client_tx.clone())
                    .await;
            *current_room = Some(room_id);
            vec![ServerEvent::RoomState(snapshot)]
        }
        ClientEvent::DrawAction { room_id, action } => {
            services::room::route_action(state, &room_id, conn_id, action).await;
            vec![]
        }
        ClientEvent::CursorMove { room_id, x, y } => {
            services::room::route_cursor(state, &room_id, conn_id, x, y).await;
            vec![]
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), ()> {
    let json = protocol::encode(event);
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
