//! Event submission handler.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

use bizhub_realtime::Submission;

use crate::dto::response::{ApiResponse, EventAccepted};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/events: submit an event on behalf of the caller.
///
/// Accepted events are stamped with the caller as `senderId` and relayed.
/// Success does not imply delivery.
pub async fn submit_event(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<ApiResponse<EventAccepted>>, ApiError> {
    let event = state.realtime.parse_event(&body)?;
    let kind = event.kind.as_str().to_string();

    let accepted = match state.realtime.submit(auth.user_id, event).await? {
        Submission::Relayed { .. } => EventAccepted {
            kind,
            call_id: None,
            call: None,
        },
        Submission::Call(session) => EventAccepted {
            kind,
            call_id: Some(session.call_id),
            call: Some(session),
        },
    };

    Ok(Json(ApiResponse::ok(accepted)))
}
