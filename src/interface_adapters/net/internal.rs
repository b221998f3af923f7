use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::RoomCreatedDto;
use crate::interface_adapters::state::AppState;
use crate::use_cases::RoomError;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

pub async fn create_room_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Rooms start empty; the first socket to join becomes the host.
    match state.rooms.create_room().await {
        Ok(room_code) => (StatusCode::CREATED, Json(RoomCreatedDto { room_code })).into_response(),
        Err(RoomError::CodeSpaceExhausted) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "no room code available".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}
