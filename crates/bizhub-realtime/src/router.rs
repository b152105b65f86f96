//! Event router: stamps producer events and delivers them to their target.

use std::sync::Arc;

use bizhub_core::error::AppError;
use bizhub_core::types::id::UserId;
use serde_json::{Map, Value};

use crate::connection::manager::ConnectionManager;
use crate::message::types::{EventKind, InboundEvent, OutboundEvent};
use crate::message::validator::{RouteTarget, resolve_target};
use crate::metrics::RealtimeMetrics;

/// Routes non-call events from any producer to live connections.
#[derive(Debug)]
pub struct EventRouter {
    connections: Arc<ConnectionManager>,
    metrics: Arc<RealtimeMetrics>,
}

impl EventRouter {
    pub fn new(connections: Arc<ConnectionManager>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            connections,
            metrics,
        }
    }

    /// Route a submitted event on behalf of `sender_id`.
    ///
    /// Returns the number of connections the event reached. Delivery is
    /// fire-and-forget: an offline receiver is not an error.
    pub fn route(&self, sender_id: UserId, event: InboundEvent) -> Result<usize, AppError> {
        let target = resolve_target(&event)?;
        let delivered = match target {
            RouteTarget::User(receiver_id) => {
                self.deliver(event.kind, sender_id, receiver_id, event.payload)
            }
            RouteTarget::Everyone => {
                self.metrics.event_routed();
                let outbound = OutboundEvent::relayed(event.kind, sender_id, None, event.payload);
                self.connections.broadcast(&outbound)
            }
            RouteTarget::Sender => self.deliver(event.kind, sender_id, sender_id, event.payload),
        };

        tracing::debug!(
            sender_id = %sender_id,
            event = event.kind.as_str(),
            delivered,
            "Event routed"
        );
        Ok(delivered)
    }

    /// Stamp and push one event to every live connection of `receiver_id`.
    pub fn deliver(
        &self,
        kind: EventKind,
        sender_id: UserId,
        receiver_id: UserId,
        payload: Map<String, Value>,
    ) -> usize {
        self.metrics.event_routed();
        let outbound = OutboundEvent::relayed(kind, sender_id, Some(receiver_id), payload);
        self.connections.push(&receiver_id, &outbound)
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.connections.is_online(user_id)
    }
}
