//! # bizhub-api
//!
//! HTTP API layer for BizHub built on Axum.
//!
//! Provides the server-sent event stream, event submission, messaging,
//! presence and call endpoints, plus middleware, extractors, DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
