//! Native sync client for the drawing gateway.
//!
//! | Module   | Purpose                                                   |
//! |----------|-----------------------------------------------------------|
//! | `agent`  | Websocket lifecycle: connect, reconnect, send, dispatch   |
//! | `roster` | Client-side view of room membership and remote cursors    |
//!
//! The agent owns the socket and a local [`surface::SurfaceController`]; the
//! embedding UI talks to the agent and never touches the wire directly.

pub mod agent;
pub mod roster;

pub use agent::{AgentConfig, AgentError, AgentEvent, ConnectError, SyncAgent};
pub use roster::RoomRoster;
