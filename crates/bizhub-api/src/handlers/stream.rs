//! Server-sent event stream handler.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tracing::info;

use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/events/stream: open the caller's live event stream.
///
/// The first frame is always `connected`. The stream stays open until the
/// client goes away or the server kills the connection; either way the
/// connection is unregistered.
pub async fn event_stream(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connection = state.realtime.connect(auth.user_id);

    info!(
        conn_id = %connection.id(),
        user_id = %auth.user_id,
        role = %auth.role,
        "Event stream opened"
    );

    let events = connection
        .into_stream()
        .map(|frame| Ok(Event::default().data(frame)));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(state.realtime.config().keepalive_interval())
            .text("keepalive"),
    )
}
