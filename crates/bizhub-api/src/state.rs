//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bizhub_auth::{JwtDecoder, TurnCredentialIssuer};
use bizhub_core::config::AppConfig;
use bizhub_realtime::RealtimeEngine;
use bizhub_service::{InMemoryMessageStore, MessageStore, MessagingService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Resolves bearer tokens into identities
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Connection registry, presence, router and call signaling
    pub realtime: Arc<RealtimeEngine>,
    /// Chat messaging service
    pub messaging: Arc<MessagingService>,
    /// Process start, for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire every collaborator from configuration with an in-memory store.
    pub fn new(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryMessageStore::new()))
    }

    /// Wire every collaborator around the given message store.
    pub fn with_store(config: AppConfig, store: Arc<dyn MessageStore>) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let ice_issuer = Arc::new(TurnCredentialIssuer::new(&config.calls));
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), ice_issuer));
        let messaging = Arc::new(MessagingService::new(store, realtime.router.clone()));

        Self {
            config: Arc::new(config),
            jwt_decoder,
            realtime,
            messaging,
            started_at: Utc::now(),
        }
    }
}
