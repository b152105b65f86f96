//! Route definitions for the BizHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(event_routes())
        .merge(message_routes())
        .merge(presence_routes())
        .merge(call_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Live stream and event submission
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events/stream", get(handlers::stream::event_stream))
        .route("/events", post(handlers::events::submit_event))
}

/// Store-then-relay chat messages
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(handlers::messages::send_message))
        .route("/messages/{peer_id}", get(handlers::messages::conversation))
}

fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/presence/online", get(handlers::presence::online_users))
        .route("/presence/{user_id}", get(handlers::presence::user_presence))
}

fn call_routes() -> Router<AppState> {
    Router::new()
        .route("/calls/active", get(handlers::calls::active_call))
        .route("/calls/ice-servers", get(handlers::calls::ice_servers))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
