use axum::{extract::State, Extension, Json};
use tracing::{info, instrument, warn};

use super::types::{SessionClaims, SessionResponse};
use crate::channel::{room_from_channel_name, ChannelAuthRequest, ChannelAuthResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new session
///
/// POST /session
/// Returns a JWT token as session_id and generated username
#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    info!("Creating new session");

    let session = state.session_service.create_session()?;

    info!(
        username = %session.username,
        session_id_length = session.session_id.len(),
        "Session created successfully"
    );

    Ok(Json(session))
}

/// HTTP handler issuing channel authorization
///
/// POST /broadcasting/auth (behind `jwt_auth`)
/// Body: {"channel_name": "room.<id>"}
#[instrument(name = "authorize_channel", skip(state, claims), fields(username = %claims.username))]
pub async fn authorize_channel(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(request): Json<ChannelAuthRequest>,
) -> Result<Json<ChannelAuthResponse>, AppError> {
    let room_id = room_from_channel_name(&request.channel_name).ok_or_else(|| {
        warn!(channel_name = %request.channel_name, "Unknown channel name");
        AppError::BadRequest(format!("Unknown channel: {}", request.channel_name))
    })?;

    let auth = state.session_service.authorize_channel(&claims, room_id)?;

    Ok(Json(ChannelAuthResponse { auth }))
}
