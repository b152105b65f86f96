//! Top-level real-time engine that ties together all subsystems.

use std::sync::{Arc, Weak};

use bizhub_core::config::RealtimeConfig;
use bizhub_core::error::AppError;
use bizhub_core::traits::IceCredentialIssuer;
use bizhub_core::types::id::UserId;
use tracing::info;

use crate::call::session::CallSession;
use crate::call::signaling::CallSignaling;
use crate::connection::heartbeat::run_heartbeat;
use crate::connection::manager::{ConnectionManager, ConnectionObserver};
use crate::connection::stream::LiveConnection;
use crate::message::types::InboundEvent;
use crate::message::validator::validate_size;
use crate::metrics::RealtimeMetrics;
use crate::presence::tracker::PresenceTracker;
use crate::router::EventRouter;

/// What happened to a submitted event.
#[derive(Debug, Clone)]
pub enum Submission {
    /// Relayed; `delivered` connections had the frame queued.
    Relayed { delivered: usize },
    /// A call signaling step, with the resulting call state.
    Call(CallSession),
}

/// Central real-time engine: one per process, shared through app state.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Event router.
    pub router: Arc<EventRouter>,
    /// Call signaling.
    pub calls: Arc<CallSignaling>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections)
            .field("calls", &self.calls)
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, ice_issuer: Arc<dyn IceCredentialIssuer>) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let presence = Arc::new(PresenceTracker::new());
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            presence.clone(),
            metrics.clone(),
        ));
        let router = Arc::new(EventRouter::new(connections.clone(), metrics.clone()));
        let calls = Arc::new(CallSignaling::new(
            router.clone(),
            ice_issuer,
            metrics.clone(),
        ));

        let observer = Arc::downgrade(&calls) as Weak<dyn ConnectionObserver>;
        connections.observe(observer);

        info!("Real-time engine initialized");

        Self {
            connections,
            presence,
            router,
            calls,
            metrics,
            config,
        }
    }

    /// Open an event stream for `user_id` and start its heartbeat.
    pub fn connect(&self, user_id: UserId) -> LiveConnection {
        let connection = self.connections.connect(user_id);
        tokio::spawn(run_heartbeat(
            connection.handle().clone(),
            self.config.heartbeat_interval(),
        ));
        connection
    }

    /// Parse and validate a raw submitted body.
    pub fn parse_event(&self, body: &[u8]) -> Result<InboundEvent, AppError> {
        validate_size(body.len(), self.config.max_event_size_bytes)?;
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Malformed event body: {e}")))?;
        InboundEvent::from_value(value)
    }

    /// Handle an event submitted by `sender_id`.
    ///
    /// Call signaling types go through the call state machine; everything
    /// else is relayed as-is.
    pub async fn submit(
        &self,
        sender_id: UserId,
        event: InboundEvent,
    ) -> Result<Submission, AppError> {
        if event.kind.is_call_signal() {
            return self.calls.handle(sender_id, event).await.map(Submission::Call);
        }
        let delivered = self.router.route(sender_id, event)?;
        Ok(Submission::Relayed { delivered })
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Close every live stream. Returns how many were closed.
    pub fn shutdown(&self) -> usize {
        info!("Shutting down real-time engine");
        let closed = self.connections.close_all();
        info!(closed, "Real-time engine shut down");
        closed
    }
}
