use protocol::{ActionKind, Point, RoomSnapshot};

use super::*;

fn state() -> (Mutex<Option<Uuid>>, Mutex<SurfaceController>, Mutex<RoomRoster>) {
    (
        Mutex::new(None),
        Mutex::new(SurfaceController::new(32, 32)),
        Mutex::new(RoomRoster::new()),
    )
}

fn user(name: &str) -> User {
    User { id: Uuid::new_v4(), name: name.into(), color: "#FF5733".into(), cursor: None }
}

fn remote_stroke(author: Uuid) -> DrawAction {
    DrawAction {
        kind: ActionKind::Draw,
        points: Some(vec![Point { x: 4.0, y: 4.0 }, Point { x: 20.0, y: 20.0 }]),
        color: Some("#3357FF".into()),
        size: Some(3.0),
        tool: None,
        layer_id: None,
        user_id: author,
        timestamp: 1,
    }
}

// =============================================================
// Server event dispatch
// =============================================================

#[test]
fn hello_records_the_connection_id_silently() {
    let (conn_id, surface, roster) = state();
    let id = Uuid::new_v4();

    let forwarded = apply_server_event(ServerEvent::Connected { id }, &conn_id, &surface, &roster);

    assert!(forwarded.is_none());
    assert_eq!(*lock(&conn_id), Some(id));
}

#[test]
fn room_state_resets_the_roster_without_painting() {
    let (conn_id, surface, roster) = state();
    let alice = user("Alice");
    let blank = lock(&surface).surface().snapshot();
    let snapshot =
        RoomSnapshot { members: vec![alice.clone()], actions: vec![remote_stroke(alice.id)] };

    let forwarded = apply_server_event(
        ServerEvent::RoomState(snapshot.clone()),
        &conn_id,
        &surface,
        &roster,
    );

    assert_eq!(forwarded, Some(AgentEvent::RoomState(snapshot)));
    assert_eq!(lock(&roster).members().len(), 1);
    assert_eq!(lock(&roster).bootstrap_actions().len(), 1);
    // The bootstrap log is stored, not replayed.
    assert_eq!(lock(&surface).surface().snapshot(), blank);
}

#[test]
fn remote_action_paints_without_touching_history() {
    let (conn_id, surface, roster) = state();
    let blank = lock(&surface).surface().snapshot();
    let action = remote_stroke(Uuid::new_v4());

    let forwarded = apply_server_event(
        ServerEvent::DrawAction(action.clone()),
        &conn_id,
        &surface,
        &roster,
    );

    assert_eq!(forwarded, Some(AgentEvent::RemoteAction(action)));
    let mut surface = lock(&surface);
    assert_ne!(surface.surface().snapshot(), blank);
    assert!(!surface.undo());
}

#[test]
fn presence_events_keep_the_roster_current() {
    let (conn_id, surface, roster) = state();
    let alice = user("Alice");

    apply_server_event(ServerEvent::UserJoined(alice.clone()), &conn_id, &surface, &roster);
    assert_eq!(lock(&roster).members().len(), 1);

    apply_server_event(
        ServerEvent::CursorMove { user_id: alice.id, x: 7.0, y: 8.0 },
        &conn_id,
        &surface,
        &roster,
    );
    let cursor = lock(&roster).member(alice.id).and_then(|m| m.cursor);
    assert_eq!(cursor, Some(Point { x: 7.0, y: 8.0 }));

    let forwarded = apply_server_event(
        ServerEvent::UserLeft { id: alice.id, name: alice.name.clone() },
        &conn_id,
        &surface,
        &roster,
    );
    assert_eq!(forwarded, Some(AgentEvent::UserLeft { id: alice.id, name: "Alice".into() }));
    assert!(lock(&roster).members().is_empty());
}

// =============================================================
// Sending
// =============================================================

#[test]
fn send_before_hello_is_rejected() {
    let (agent, _out_rx) = SyncAgent::detached("lobby");
    let draft = DrawActionDraft::stroke(ActionKind::Draw, vec![Point { x: 1.0, y: 1.0 }]);

    let err = agent.send_draw_action(draft).unwrap_err();
    assert!(matches!(err, AgentError::NotConnected));
}

#[test]
fn send_stamps_paints_and_queues_the_action() {
    let (agent, mut out_rx) = SyncAgent::detached("lobby");
    let conn_id = Uuid::new_v4();
    agent.set_connection_id(conn_id);
    let blank = lock(&agent.surface).surface().snapshot();

    let draft = DrawActionDraft::stroke(
        ActionKind::Draw,
        vec![Point { x: 4.0, y: 4.0 }, Point { x: 20.0, y: 20.0 }],
    );
    let action = agent.send_draw_action(draft).expect("send should succeed");

    assert_eq!(action.user_id, conn_id);
    assert!(action.timestamp > 0);

    // Painted locally and recorded as one undoable step.
    assert_ne!(lock(&agent.surface).surface().snapshot(), blank);
    assert!(agent.undo());
    assert_eq!(lock(&agent.surface).surface().snapshot(), blank);

    match out_rx.try_recv().expect("action should be queued") {
        ClientEvent::DrawAction { room_id, action: queued } => {
            assert_eq!(room_id, "lobby");
            assert_eq!(queued, action);
        }
        other => panic!("expected draw-action, got {other:?}"),
    }
}

#[test]
fn cursor_updates_are_queued_for_the_room() {
    let (agent, mut out_rx) = SyncAgent::detached("lobby");

    agent.send_cursor(3.0, 9.0).expect("send should succeed");

    match out_rx.try_recv().expect("cursor should be queued") {
        ClientEvent::CursorMove { room_id, x, y } => {
            assert_eq!(room_id, "lobby");
            assert!((x - 3.0).abs() < f64::EPSILON);
            assert!((y - 9.0).abs() < f64::EPSILON);
        }
        other => panic!("expected cursor-move, got {other:?}"),
    }
}

#[test]
fn join_room_requires_a_connection_and_switches_rooms() {
    let (agent, mut out_rx) = SyncAgent::detached("lobby");
    assert!(matches!(agent.join_room("atelier", "Alice"), Err(AgentError::NotConnected)));

    agent.set_connection_id(Uuid::new_v4());
    agent.join_room("atelier", "Alice").expect("join should queue");

    match out_rx.try_recv().expect("join should be queued") {
        ClientEvent::JoinRoom { room_id, user_name } => {
            assert_eq!(room_id, "atelier");
            assert_eq!(user_name, "Alice");
        }
        other => panic!("expected join-room, got {other:?}"),
    }

    // Subsequent events target the new room.
    agent.send_cursor(1.0, 2.0).expect("cursor should queue");
    match out_rx.try_recv().expect("cursor should be queued") {
        ClientEvent::CursorMove { room_id, .. } => assert_eq!(room_id, "atelier"),
        other => panic!("expected cursor-move, got {other:?}"),
    }
}

#[test]
fn send_after_driver_shutdown_reports_channel_closed() {
    let (agent, out_rx) = SyncAgent::detached("lobby");
    agent.set_connection_id(Uuid::new_v4());
    drop(out_rx);

    let draft = DrawActionDraft::stroke(ActionKind::Draw, vec![Point { x: 1.0, y: 1.0 }]);
    assert!(matches!(agent.send_draw_action(draft), Err(AgentError::ChannelClosed)));
    assert!(matches!(agent.send_cursor(0.0, 0.0), Err(AgentError::ChannelClosed)));
}

// =============================================================
// Bootstrap replay
// =============================================================

#[test]
fn replay_bootstrap_paints_the_log_as_one_undoable_step() {
    let (agent, _out_rx) = SyncAgent::detached("lobby");
    let blank = lock(&agent.surface).surface().snapshot();
    let author = Uuid::new_v4();
    lock(&agent.roster).reset(RoomSnapshot {
        members: vec![],
        actions: vec![remote_stroke(author), remote_stroke(author)],
    });

    agent.replay_bootstrap();

    assert_ne!(lock(&agent.surface).surface().snapshot(), blank);
    assert!(lock(&agent.roster).bootstrap_actions().is_empty());
    assert!(agent.undo());
    assert_eq!(lock(&agent.surface).surface().snapshot(), blank);

    // A second replay has nothing left to paint and records nothing.
    agent.redo();
    agent.replay_bootstrap();
    assert!(agent.undo());
    assert!(!agent.undo());
}

// =============================================================
// Dial policy
// =============================================================

#[tokio::test(start_paused = true)]
async fn dial_gives_up_after_bounded_attempts() {
    // Nothing listens on this port; every attempt is refused immediately and
    // the paused clock fast-forwards the fixed delays.
    let err = dial("ws://127.0.0.1:9/").await.unwrap_err();
    match err {
        ConnectError::Exhausted { attempts, .. } => assert_eq!(attempts, RECONNECT_ATTEMPTS),
        other => panic!("expected exhausted, got {other:?}"),
    }
}
