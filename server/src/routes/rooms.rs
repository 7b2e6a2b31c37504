//! REST handlers for room discovery and creation.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOverview {
    pub id: String,
    /// Rooms have no stored display name; the id doubles as one.
    pub name: String,
    pub user_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    /// Accepted for wire compatibility; private rooms are not enforced.
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Serialize)]
pub struct CreateRoomResponse {
    pub id: String,
    pub name: String,
}

/// GET /rooms — every live room with its member count.
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomOverview>> {
    let mut rooms: Vec<RoomOverview> = services::room::list(&state)
        .await
        .into_iter()
        .map(|(id, user_count)| RoomOverview { name: id.clone(), id, user_count })
        .collect();
    rooms.sort_by(|a, b| a.id.cmp(&b.id));
    Json(rooms)
}

/// POST /rooms — mint a fresh room id.
///
/// The room is not registered here; it materializes when the first member
/// joins over the websocket. Minting is just id generation, so a client can
/// share the id before anyone connects.
pub async fn create_room(Json(body): Json<CreateRoomRequest>) -> Response {
    let Some(name) = body.name.filter(|n| !n.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "name required").into_response();
    };

    if body.is_private {
        tracing::debug!("private flag ignored: rooms are open");
    }

    let id = format!("room-{}", Uuid::new_v4());
    (StatusCode::CREATED, Json(CreateRoomResponse { id, name })).into_response()
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod tests;
