//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::http::{RoomStateDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Room catalog without passwords
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    match state.get_rooms_usecase.execute().await {
        Ok(rooms) => Ok(Json(rooms.iter().map(RoomSummaryDto::from).collect())),
        Err(e) => {
            tracing::error!("Failed to list rooms: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Live presence of every occupied room (for testing purposes)
pub async fn debug_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomStateDto>>, StatusCode> {
    match state.coordinator.overview().await {
        Ok(rooms) => Ok(Json(
            rooms
                .into_iter()
                .map(|room| RoomStateDto::from_overview(room, state.utc_offset_hours))
                .collect(),
        )),
        Err(e) => {
            tracing::error!("Failed to read room state: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
