//! Presence query handlers.

use axum::Json;
use axum::extract::{Path, State};

use bizhub_core::types::UserId;
use bizhub_realtime::presence::PresenceRecord;

use crate::dto::response::{ApiResponse, OnlineUsersResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence/online
pub async fn online_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<OnlineUsersResponse>> {
    let online_users = state.realtime.connections.online_users();
    Json(ApiResponse::ok(OnlineUsersResponse {
        count: online_users.len(),
        online_users,
    }))
}

/// GET /api/presence/{user_id}
pub async fn user_presence(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Json<ApiResponse<PresenceRecord>> {
    Json(ApiResponse::ok(state.realtime.connections.presence_of(user_id)))
}
