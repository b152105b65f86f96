//! Chat message handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use bizhub_core::types::UserId;
use bizhub_entity::message::StoredMessage;

use crate::dto::request::{HistoryQuery, SendMessageRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoredMessage>>), ApiError> {
    let message = state
        .messaging
        .send_message(auth.context(), req.receiver_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// GET /api/messages/{peer_id}
pub async fn conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(peer_id): Path<UserId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<StoredMessage>>>, ApiError> {
    let messages = state
        .messaging
        .history(auth.context(), peer_id, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(messages)))
}
