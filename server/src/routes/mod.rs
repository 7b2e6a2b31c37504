//! Router assembly.
//!
//! Two surfaces share one Axum router: a small REST face for room discovery
//! and creation, and the websocket gateway at `/ws` that carries everything
//! realtime. CORS is wide open — browsers talk to this from arbitrary dev
//! origins.

pub mod rooms;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
