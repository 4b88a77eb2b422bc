use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::relay::RoomRegistry;
use crate::session::SessionService;

/// Shared relay state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(session_service: SessionService, rooms: RoomRegistry) -> Self {
        Self {
            session_service,
            rooms,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionService::default(), RoomRegistry::new())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
