// Room-scoped broadcast relay
//
// The relay is the server side of the websocket channel: it authorizes
// channel joins and forwards each message to the other members of the room.
// It never interprets game events.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::session;
use crate::shared::AppState;

// Public API - what other modules can use
pub use handlers::{websocket_handler, RelayMessageHandler};
pub use rooms::RoomRegistry;

// Internal modules
mod handlers;
mod rooms;
mod socket;

/// Builds the relay router
///
/// - `POST /session` issues a session token
/// - `POST /broadcasting/auth` exchanges a session token for a channel token
/// - `GET /ws/:room_id?auth=...` joins the room channel
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", post(session::create_session))
        .route(
            "/broadcasting/auth",
            post(session::authorize_channel)
                .layer(middleware::from_fn_with_state(state.clone(), session::jwt_auth)),
        )
        .route("/ws/:room_id", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
