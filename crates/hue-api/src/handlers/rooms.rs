//! Room listing and detail handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hue_core::{sample, RoomDetail, RoomSummary, TimeRangeMode};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsResponse {
    pub success: bool,
    pub rooms: Vec<RoomSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_poll: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct RoomDetailResponse {
    pub success: bool,
    pub room: RoomDetail,
}

#[derive(Deserialize)]
pub struct RoomDetailQuery {
    /// Chart time range; when present the reading history is sampled
    /// server-side before it is returned
    pub range: Option<String>,
}

/// GET /api/rooms
/// List all rooms with their current state
pub async fn list_rooms(State(state): State<AppState>) -> Json<RoomsResponse> {
    Json(RoomsResponse {
        success: true,
        rooms: state.store.all_rooms(),
        last_poll: state.store.last_poll_time(),
    })
}

/// GET /api/rooms/{room_id}
/// Room detail with its reading history; `?range=auto|30d|7d|1d|1h`
/// returns the chart-ready sampled sequence instead of the raw history
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<RoomDetailQuery>,
) -> Result<Json<RoomDetailResponse>, ApiError> {
    let mut room = state
        .store
        .room_detail(&room_id)
        .ok_or_else(|| ApiError::NotFound(format!("Room not found: {}", room_id)))?;

    if let Some(range) = query.range.as_deref() {
        let mode: TimeRangeMode = range
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("{}", e)))?;
        let now = Utc::now().timestamp_millis();
        room.readings = sample(&room.readings, mode, now);
    }

    Ok(Json(RoomDetailResponse {
        success: true,
        room,
    }))
}
