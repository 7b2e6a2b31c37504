//! Websocket sync agent.
//!
//! DESIGN
//! ======
//! `SyncAgent::connect` dials the gateway, waits for the `connected` hello,
//! joins the room, and spawns a driver task that owns the socket. The driver
//! runs a `select!` loop:
//! - Outbound events queued by the agent → sent on the socket
//! - Inbound server events → applied to the local surface/roster, then
//!   forwarded to the embedding UI through the agent's event stream
//!
//! When the socket drops mid-session the driver redials with the same bounded
//! policy used at connect time: up to [`RECONNECT_ATTEMPTS`] tries, a fixed
//! [`RECONNECT_DELAY`] apart. On success it repeats the hello + join
//! handshake (the server answers with a fresh `room-state` bootstrap); on
//! exhaustion it emits [`AgentEvent::ConnectionLost`] and stops. Outbound
//! events are fire-and-forget: anything in flight when the socket dies is
//! dropped, not replayed.
//!
//! Undo and redo act on the local history stack only. They are never sent to
//! the server and never affect what other participants see.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use protocol::{ClientEvent, DrawAction, DrawActionDraft, ServerEvent, User};
use surface::{ImageFormat, SurfaceController};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{info, warn};
use uuid::Uuid;

use crate::roster::RoomRoster;

/// Connection attempts per dial, initial connect and reconnect alike.
pub const RECONNECT_ATTEMPTS: u32 = 5;
/// Fixed delay between attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

// =============================================================================
// ERRORS
// =============================================================================

/// Failure to establish (or re-establish) a gateway connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("gave up after {attempts} connection attempts: {source}")]
    Exhausted {
        attempts: u32,
        source: tungstenite::Error,
    },
    #[error("websocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),
    #[error("server closed before completing the hello")]
    NoHello,
}

/// Failure of an agent operation after connect.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The hello has not arrived yet, so outgoing actions cannot be stamped.
    #[error("not connected: no connection id assigned yet")]
    NotConnected,
    /// The driver task has stopped; the agent can no longer send.
    #[error("connection driver has shut down")]
    ChannelClosed,
    #[error(transparent)]
    Export(#[from] surface::SurfaceError),
}

// =============================================================================
// EVENTS
// =============================================================================

/// What the agent reports to the embedding UI.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Fresh bootstrap after a join (or rejoin). The roster has already been
    /// reset from it; the log inside is available for replay on demand.
    RoomState(protocol::RoomSnapshot),
    UserJoined(User),
    UserLeft { id: Uuid, name: String },
    /// A remote action, already painted onto the local surface.
    RemoteAction(DrawAction),
    CursorMove { user_id: Uuid, x: f64, y: f64 },
    /// The socket dropped; a redial is starting.
    Disconnected,
    /// A redial succeeded and the room was rejoined.
    Reconnected,
    /// Terminal: every redial attempt failed and the driver stopped.
    ConnectionLost(String),
}

// =============================================================================
// AGENT
// =============================================================================

pub struct AgentConfig {
    pub url: String,
    pub room_id: String,
    pub user_name: String,
    pub surface_width: u32,
    pub surface_height: u32,
}

impl AgentConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, room_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            room_id: room_id.into(),
            user_name: user_name.into(),
            surface_width: 800,
            surface_height: 600,
        }
    }
}

/// The room/identity pair the driver rejoins with after a reconnect. Shared
/// between the agent (which can switch rooms) and the driver task.
struct Session {
    room_id: String,
    user_name: String,
}

pub struct SyncAgent {
    session: Arc<Mutex<Session>>,
    conn_id: Arc<Mutex<Option<Uuid>>>,
    surface: Arc<Mutex<SurfaceController>>,
    roster: Arc<Mutex<RoomRoster>>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    events: mpsc::UnboundedReceiver<AgentEvent>,
}

impl SyncAgent {
    /// Dial the gateway, join `room_id`, and spawn the connection driver.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Exhausted`] when every dial attempt fails, or
    /// a transport/hello error from the handshake.
    pub async fn connect(config: AgentConfig) -> Result<Self, ConnectError> {
        let mut socket = dial(&config.url).await?;
        let hello_id = handshake(&mut socket, &config.room_id, &config.user_name).await?;
        info!(conn_id = %hello_id, room = config.room_id, "connected and joined");

        let conn_id = Arc::new(Mutex::new(Some(hello_id)));
        let surface = Arc::new(Mutex::new(SurfaceController::new(
            config.surface_width,
            config.surface_height,
        )));
        let roster = Arc::new(Mutex::new(RoomRoster::new()));
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let session = Arc::new(Mutex::new(Session {
            room_id: config.room_id,
            user_name: config.user_name,
        }));
        tokio::spawn(run(
            socket,
            config.url,
            Arc::clone(&session),
            Arc::clone(&conn_id),
            Arc::clone(&surface),
            Arc::clone(&roster),
            out_rx,
            events_tx,
        ));

        Ok(Self {
            session,
            conn_id,
            surface,
            roster,
            outbound: out_tx,
            events: events_rx,
        })
    }

    /// The connection id from the most recent hello.
    #[must_use]
    pub fn connection_id(&self) -> Option<Uuid> {
        *lock(&self.conn_id)
    }

    /// Wait for the next agent event. `None` once the driver has stopped.
    pub async fn next_event(&mut self) -> Option<AgentEvent> {
        self.events.recv().await
    }

    /// Non-blocking event poll for UI frame loops.
    pub fn try_event(&mut self) -> Option<AgentEvent> {
        self.events.try_recv().ok()
    }

    /// Switch to (or rejoin) a room. The server answers with a `room-state`
    /// bootstrap and implicitly leaves the previous room.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotConnected`] before the hello arrives,
    /// [`AgentError::ChannelClosed`] after the driver stops.
    pub fn join_room(&self, room_id: &str, user_name: &str) -> Result<(), AgentError> {
        if self.connection_id().is_none() {
            return Err(AgentError::NotConnected);
        }
        {
            let mut session = lock(&self.session);
            session.room_id = room_id.to_string();
            session.user_name = user_name.to_string();
        }
        self.outbound
            .send(ClientEvent::JoinRoom {
                room_id: room_id.to_string(),
                user_name: user_name.to_string(),
            })
            .map_err(|_| AgentError::ChannelClosed)
    }

    /// Tear down the connection. The server observes the channel closing and
    /// removes this connection from its room; no explicit leave is sent.
    pub fn disconnect(self) {
        // Dropping the outbound sender stops the driver, which closes the
        // socket politely.
        drop(self);
    }

    /// Stamp a locally produced draft, paint it, record a history snapshot,
    /// and queue it for the room.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotConnected`] before the hello arrives,
    /// [`AgentError::ChannelClosed`] after the driver stops.
    pub fn send_draw_action(&self, draft: DrawActionDraft) -> Result<DrawAction, AgentError> {
        let conn_id = self.connection_id().ok_or(AgentError::NotConnected)?;
        let action = draft.into_action(conn_id, now_ms());

        {
            let mut surface = lock(&self.surface);
            surface.apply_action(&action);
            surface.save_snapshot();
        }

        let room_id = lock(&self.session).room_id.clone();
        self.outbound
            .send(ClientEvent::DrawAction { room_id, action: action.clone() })
            .map_err(|_| AgentError::ChannelClosed)?;
        Ok(action)
    }

    /// Queue an ephemeral cursor position.
    ///
    /// # Errors
    ///
    /// [`AgentError::ChannelClosed`] after the driver stops.
    pub fn send_cursor(&self, x: f64, y: f64) -> Result<(), AgentError> {
        let room_id = lock(&self.session).room_id.clone();
        self.outbound
            .send(ClientEvent::CursorMove { room_id, x, y })
            .map_err(|_| AgentError::ChannelClosed)
    }

    /// Step the local surface back one history snapshot. Local only.
    pub fn undo(&self) -> bool {
        lock(&self.surface).undo()
    }

    /// Step the local surface forward one history snapshot. Local only.
    pub fn redo(&self) -> bool {
        lock(&self.surface).redo()
    }

    /// Paint the bootstrap log from the last `room-state` onto the surface,
    /// in order, as one undoable step. A no-op if the log was already taken.
    pub fn replay_bootstrap(&self) {
        let actions = lock(&self.roster).take_bootstrap_actions();
        if actions.is_empty() {
            return;
        }
        let mut surface = lock(&self.surface);
        for action in &actions {
            surface.apply_action(action);
        }
        surface.save_snapshot();
    }

    /// Export the current surface as a data URL.
    ///
    /// # Errors
    ///
    /// Propagates encoding failures from the surface crate.
    pub fn export_image(&self, format: ImageFormat) -> Result<String, AgentError> {
        Ok(lock(&self.surface).export_image(format)?)
    }

    /// Shared handle to the local surface, for rendering.
    #[must_use]
    pub fn surface_handle(&self) -> Arc<Mutex<SurfaceController>> {
        Arc::clone(&self.surface)
    }

    /// Shared handle to the roster, for presence display.
    #[must_use]
    pub fn roster_handle(&self) -> Arc<Mutex<RoomRoster>> {
        Arc::clone(&self.roster)
    }
}

// =============================================================================
// CONNECTION DRIVER
// =============================================================================

enum Stopped {
    SocketClosed,
    OutboundClosed,
}

#[allow(clippy::too_many_arguments)]
async fn run(
    mut socket: WsStream,
    url: String,
    session: Arc<Mutex<Session>>,
    conn_id: Arc<Mutex<Option<Uuid>>>,
    surface: Arc<Mutex<SurfaceController>>,
    roster: Arc<Mutex<RoomRoster>>,
    mut out_rx: mpsc::UnboundedReceiver<ClientEvent>,
    events_tx: mpsc::UnboundedSender<AgentEvent>,
) {
    loop {
        match drive_socket(&mut socket, &mut out_rx, &conn_id, &surface, &roster, &events_tx).await
        {
            Stopped::OutboundClosed => {
                // Agent dropped: close politely and stop.
                let _ = socket.close(None).await;
                return;
            }
            Stopped::SocketClosed => {}
        }

        *lock(&conn_id) = None;
        let _ = events_tx.send(AgentEvent::Disconnected);
        warn!("socket dropped, redialing");

        match reconnect(&url, &session).await {
            Ok((new_socket, new_id)) => {
                *lock(&conn_id) = Some(new_id);
                socket = new_socket;
                let _ = events_tx.send(AgentEvent::Reconnected);
                info!(conn_id = %new_id, "rejoined after reconnect");
            }
            Err(e) => {
                let _ = events_tx.send(AgentEvent::ConnectionLost(e.to_string()));
                warn!(error = %e, "reconnect exhausted, driver stopping");
                return;
            }
        }
    }
}

async fn reconnect(url: &str, session: &Mutex<Session>) -> Result<(WsStream, Uuid), ConnectError> {
    let (room_id, user_name) = {
        let session = lock(session);
        (session.room_id.clone(), session.user_name.clone())
    };
    let mut socket = dial(url).await?;
    let id = handshake(&mut socket, &room_id, &user_name).await?;
    Ok((socket, id))
}

async fn drive_socket(
    socket: &mut WsStream,
    out_rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    conn_id: &Mutex<Option<Uuid>>,
    surface: &Mutex<SurfaceController>,
    roster: &Mutex<RoomRoster>,
    events_tx: &mpsc::UnboundedSender<AgentEvent>,
) -> Stopped {
    loop {
        tokio::select! {
            outbound = out_rx.recv() => {
                let Some(event) = outbound else { return Stopped::OutboundClosed };
                let text = protocol::encode(&event);
                if socket.send(Message::Text(text.into())).await.is_err() {
                    return Stopped::SocketClosed;
                }
            }
            inbound = socket.next() => {
                let Some(Ok(msg)) = inbound else { return Stopped::SocketClosed };
                match msg {
                    Message::Text(text) => match protocol::decode_server_event(&text) {
                        Ok(event) => {
                            if let Some(forward) =
                                apply_server_event(event, conn_id, surface, roster)
                            {
                                let _ = events_tx.send(forward);
                            }
                        }
                        Err(e) => warn!(error = %e, "unknown server event dropped"),
                    },
                    Message::Close(_) => return Stopped::SocketClosed,
                    _ => {}
                }
            }
        }
    }
}

/// Apply one server event to local state and pick what to surface to the UI.
///
/// Remote draw actions paint the surface without touching the history stack:
/// only the local user's own strokes are undoable.
fn apply_server_event(
    event: ServerEvent,
    conn_id: &Mutex<Option<Uuid>>,
    surface: &Mutex<SurfaceController>,
    roster: &Mutex<RoomRoster>,
) -> Option<AgentEvent> {
    match event {
        ServerEvent::Connected { id } => {
            *lock(conn_id) = Some(id);
            None
        }
        ServerEvent::RoomState(snapshot) => {
            lock(roster).reset(snapshot.clone());
            Some(AgentEvent::RoomState(snapshot))
        }
        ServerEvent::UserJoined(user) => {
            lock(roster).add(user.clone());
            Some(AgentEvent::UserJoined(user))
        }
        ServerEvent::UserLeft { id, name } => {
            lock(roster).remove(id);
            Some(AgentEvent::UserLeft { id, name })
        }
        ServerEvent::DrawAction(action) => {
            lock(surface).apply_action(&action);
            Some(AgentEvent::RemoteAction(action))
        }
        ServerEvent::CursorMove { user_id, x, y } => {
            lock(roster).set_cursor(user_id, x, y);
            Some(AgentEvent::CursorMove { user_id, x, y })
        }
    }
}

// =============================================================================
// DIAL + HANDSHAKE
// =============================================================================

/// Dial with the bounded retry policy: up to [`RECONNECT_ATTEMPTS`] tries,
/// [`RECONNECT_DELAY`] apart.
async fn dial(url: &str) -> Result<WsStream, ConnectError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match tokio_tungstenite::connect_async(url).await {
            Ok((socket, _response)) => return Ok(socket),
            Err(e) => {
                warn!(attempt, error = %e, "connection attempt failed");
                if attempt >= RECONNECT_ATTEMPTS {
                    return Err(ConnectError::Exhausted { attempts: RECONNECT_ATTEMPTS, source: e });
                }
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Wait for the `connected` hello, then send the room join.
async fn handshake(
    socket: &mut WsStream,
    room_id: &str,
    user_name: &str,
) -> Result<Uuid, ConnectError> {
    let id = loop {
        let Some(msg) = socket.next().await else {
            return Err(ConnectError::NoHello);
        };
        if let Message::Text(text) = msg? {
            if let Ok(ServerEvent::Connected { id }) = protocol::decode_server_event(&text) {
                break id;
            }
        }
    };

    let join =
        ClientEvent::JoinRoom { room_id: room_id.to_string(), user_name: user_name.to_string() };
    socket.send(Message::Text(protocol::encode(&join).into())).await?;
    Ok(id)
}

// =============================================================================
// HELPERS
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sender-local clock, milliseconds since the Unix epoch.
fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
impl SyncAgent {
    /// An agent with no driver task: outbound events land on the returned
    /// receiver instead of a socket.
    fn detached(room_id: &str) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let agent = Self {
            session: Arc::new(Mutex::new(Session {
                room_id: room_id.to_string(),
                user_name: "Tester".to_string(),
            })),
            conn_id: Arc::new(Mutex::new(None)),
            surface: Arc::new(Mutex::new(SurfaceController::new(32, 32))),
            roster: Arc::new(Mutex::new(RoomRoster::new())),
            outbound: out_tx,
            events: events_rx,
        };
        (agent, out_rx)
    }

    fn set_connection_id(&self, id: Uuid) {
        *lock(&self.conn_id) = Some(id);
    }
}

#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;
