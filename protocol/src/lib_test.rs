use serde_json::json;
use uuid::Uuid;

use super::*;

fn sample_action(kind: ActionKind) -> DrawAction {
    DrawAction {
        kind,
        points: Some(vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }]),
        color: Some("#FF5733".into()),
        size: Some(5.0),
        tool: Some("brush".into()),
        layer_id: Some("layer-1".into()),
        user_id: Uuid::new_v4(),
        timestamp: 1_700_000_000_000,
    }
}

// =============================================================
// DrawAction wire shape
// =============================================================

#[test]
fn action_kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&ActionKind::Draw).unwrap(), "\"draw\"");
    assert_eq!(serde_json::to_string(&ActionKind::Erase).unwrap(), "\"erase\"");
    assert_eq!(serde_json::to_string(&ActionKind::Clear).unwrap(), "\"clear\"");
    assert_eq!(serde_json::to_string(&ActionKind::Undo).unwrap(), "\"undo\"");
    assert_eq!(serde_json::to_string(&ActionKind::Redo).unwrap(), "\"redo\"");
}

#[test]
fn draw_action_uses_observed_field_names() {
    let action = sample_action(ActionKind::Draw);
    let value = serde_json::to_value(&action).unwrap();

    assert_eq!(value["type"], "draw");
    assert_eq!(value["layerId"], "layer-1");
    assert_eq!(value["userId"], json!(action.user_id.to_string()));
    assert_eq!(value["timestamp"], json!(1_700_000_000_000_i64));
    assert!(value.get("kind").is_none());
}

#[test]
fn draw_action_round_trip() {
    let action = sample_action(ActionKind::Erase);
    let text = encode(&action);
    let back: DrawAction = serde_json::from_str(&text).unwrap();
    assert_eq!(back, action);
}

#[test]
fn clear_action_omits_optional_fields() {
    let action = DrawAction {
        kind: ActionKind::Clear,
        points: None,
        color: None,
        size: None,
        tool: None,
        layer_id: None,
        user_id: Uuid::new_v4(),
        timestamp: 0,
    };
    let value = serde_json::to_value(&action).unwrap();
    assert!(value.get("points").is_none());
    assert!(value.get("color").is_none());
    assert!(value.get("layerId").is_none());
}

#[test]
fn draft_stamping_fills_author_and_clock() {
    let user_id = Uuid::new_v4();
    let draft = DrawActionDraft::stroke(
        ActionKind::Draw,
        vec![Point { x: 0.0, y: 0.0 }],
    );
    let action = draft.into_action(user_id, 42);

    assert_eq!(action.kind, ActionKind::Draw);
    assert_eq!(action.user_id, user_id);
    assert_eq!(action.timestamp, 42);
}

#[test]
fn draft_without_kind_defaults_to_draw() {
    let action = DrawActionDraft::default().into_action(Uuid::new_v4(), 0);
    assert_eq!(action.kind, ActionKind::Draw);
}

// =============================================================
// Event unions
// =============================================================

#[test]
fn join_room_wire_shape() {
    let event = ClientEvent::JoinRoom { room_id: "r1".into(), user_name: "Alice".into() };
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["event"], "join-room");
    assert_eq!(value["data"]["roomId"], "r1");
    assert_eq!(value["data"]["userName"], "Alice");
}

#[test]
fn client_events_round_trip() {
    let events = vec![
        ClientEvent::JoinRoom { room_id: "r1".into(), user_name: "Alice".into() },
        ClientEvent::DrawAction { room_id: "r1".into(), action: sample_action(ActionKind::Draw) },
        ClientEvent::CursorMove { room_id: "r1".into(), x: 10.5, y: -3.0 },
    ];
    for event in events {
        let back = decode_client_event(&encode(&event)).unwrap();
        assert_eq!(back, event);
    }
}

#[test]
fn server_events_round_trip() {
    let user = User { id: Uuid::new_v4(), name: "Bob".into(), color: "#33FF57".into(), cursor: None };
    let events = vec![
        ServerEvent::Connected { id: Uuid::new_v4() },
        ServerEvent::RoomState(RoomSnapshot {
            members: vec![user.clone()],
            actions: vec![sample_action(ActionKind::Draw)],
        }),
        ServerEvent::UserJoined(user.clone()),
        ServerEvent::UserLeft { id: user.id, name: "Bob".into() },
        ServerEvent::DrawAction(sample_action(ActionKind::Clear)),
        ServerEvent::CursorMove { user_id: user.id, x: 1.0, y: 2.0 },
    ];
    for event in events {
        let back = decode_server_event(&encode(&event)).unwrap();
        assert_eq!(back, event);
    }
}

#[test]
fn cursor_move_broadcast_uses_user_id_key() {
    let user_id = Uuid::new_v4();
    let event = ServerEvent::CursorMove { user_id, x: 7.0, y: 8.0 };
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["event"], "cursor-move");
    assert_eq!(value["data"]["userId"], json!(user_id.to_string()));
}

#[test]
fn decode_rejects_unknown_event() {
    let result = decode_client_event(r#"{"event":"teleport","data":{}}"#);
    assert!(result.is_err());
}

#[test]
fn decode_rejects_invalid_json() {
    assert!(decode_server_event("not json").is_err());
}

#[test]
fn room_snapshot_preserves_member_order() {
    let mut snapshot = RoomSnapshot::default();
    for name in ["a", "b", "c"] {
        snapshot.members.push(User {
            id: Uuid::new_v4(),
            name: name.into(),
            color: "#3357FF".into(),
            cursor: None,
        });
    }
    let back: RoomSnapshot = serde_json::from_str(&encode(&snapshot)).unwrap();
    let names: Vec<&str> = back.members.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
