//! Call query handlers.

use axum::Json;
use axum::extract::State;

use bizhub_realtime::call::CallSession;

use crate::dto::response::{ApiResponse, IceServersResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/calls/active: the caller's current call, or `null`.
pub async fn active_call(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<ApiResponse<Option<CallSession>>> {
    Json(ApiResponse::ok(state.realtime.calls.active_call(&auth.user_id)))
}

/// GET /api/calls/ice-servers
pub async fn ice_servers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<IceServersResponse>>, ApiError> {
    let ice_servers = state.realtime.calls.ice_servers(&auth.user_id).await?;
    Ok(Json(ApiResponse::ok(IceServersResponse { ice_servers })))
}
