//! Connection manager: registration, presence transitions, and delivery.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use bizhub_core::config::RealtimeConfig;
use bizhub_core::types::id::{ConnectionId, UserId};
use tokio::sync::mpsc;

use super::handle::{ConnectionHandle, SendError};
use super::registry::{ConnectionRegistry, Registration};
use super::stream::LiveConnection;
use crate::message::serializer::to_frame;
use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;
use crate::presence::status::PresenceRecord;
use crate::presence::tracker::PresenceTracker;

/// Room for `connected` plus the user's own `online` status, both queued
/// before the stream is first polled.
const MIN_CHANNEL_BUFFER: usize = 2;

/// Notified when a user loses their last live connection.
///
/// Called after the offline broadcast, outside every manager lock, so
/// implementations may push events.
pub trait ConnectionObserver: Send + Sync {
    fn user_offline(&self, user_id: UserId);
}

/// Owns the registry and turns connection lifecycle into presence events.
///
/// Register and unregister are serialized so the offline→online and
/// online→offline transitions of a user are observed exactly once.
/// Delivery never holds a lock while writing to a connection; handles
/// that fail are collected and unregistered afterwards.
pub struct ConnectionManager {
    registry: ConnectionRegistry,
    presence: Arc<PresenceTracker>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
    transitions: Mutex<()>,
    observers: RwLock<Vec<Weak<dyn ConnectionObserver>>>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.registry.connection_count())
            .field("users", &self.registry.user_count())
            .finish()
    }
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new(
        config: RealtimeConfig,
        presence: Arc<PresenceTracker>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            presence,
            metrics,
            config,
            transitions: Mutex::new(()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to offline transitions.
    pub fn observe(&self, observer: Weak<dyn ConnectionObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Open a new stream for `user_id`.
    ///
    /// The returned connection yields `connected` before anything else and
    /// unregisters itself when dropped.
    pub fn connect(self: &Arc<Self>, user_id: UserId) -> LiveConnection {
        let (sender, receiver) =
            mpsc::channel(self.config.channel_buffer_size.max(MIN_CHANNEL_BUFFER));
        let handle = Arc::new(ConnectionHandle::new(user_id, sender));

        // Queued before registration so no other event can precede it.
        match to_frame(&OutboundEvent::connected(user_id)) {
            Ok(frame) => {
                let _ = handle.send(frame);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize connected event"),
        }

        self.register(handle.clone());
        LiveConnection::new(Arc::clone(self), handle, receiver)
    }

    /// Add a handle to the registry.
    ///
    /// Returns false if the connection ID was already registered. Announces
    /// the user as online when this is their first live connection.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> bool {
        let user_id = handle.user_id;
        let failed = {
            let _transition = self.lock_transitions();
            let first = match self.registry.insert(handle.clone()) {
                Registration::Duplicate => return false,
                Registration::Added { first } => first,
            };
            self.metrics.connection_opened();
            self.evict_excess(&user_id);

            if first {
                let event = self
                    .presence
                    .went_online(user_id, self.registry.online_users());
                self.metrics.presence_broadcast();
                self.deliver(&self.registry.all_connections(), &event).1
            } else {
                Vec::new()
            }
        };

        tracing::info!(
            connection_id = %handle.id,
            user_id = %user_id,
            total = self.registry.connection_count(),
            "Connection registered"
        );

        self.reap(failed);
        true
    }

    /// Remove a connection. Returns false if it was not registered.
    ///
    /// Announces the user as offline, records last-seen, and notifies
    /// observers when this was their last live connection.
    pub fn unregister(&self, conn_id: &ConnectionId) -> bool {
        let (removal, failed) = {
            let _transition = self.lock_transitions();
            let Some(removal) = self.registry.remove(conn_id) else {
                return false;
            };
            removal.handle.mark_dead();
            self.metrics.connection_closed();

            let failed = if removal.last {
                let event = self
                    .presence
                    .went_offline(removal.handle.user_id, self.registry.online_users());
                self.metrics.presence_broadcast();
                self.deliver(&self.registry.all_connections(), &event).1
            } else {
                Vec::new()
            };
            (removal, failed)
        };

        tracing::info!(
            connection_id = %conn_id,
            user_id = %removal.handle.user_id,
            duration_secs = removal.handle.duration_secs(),
            last = removal.last,
            "Connection unregistered"
        );

        if removal.last {
            self.notify_offline(removal.handle.user_id);
        }
        self.reap(failed);
        true
    }

    /// Deliver `event` to every live connection of `user_id`.
    ///
    /// Returns the number of connections the frame was queued on. Zero is
    /// not an error: the user may simply be offline.
    pub fn push(&self, user_id: &UserId, event: &OutboundEvent) -> usize {
        let handles = self.registry.user_connections(user_id);
        if handles.is_empty() {
            tracing::debug!(
                user_id = %user_id,
                event = event.type_name(),
                "No live connections, event dropped"
            );
            return 0;
        }
        let (delivered, failed) = self.deliver(&handles, event);
        self.reap(failed);
        delivered
    }

    /// Deliver `event` to every live connection.
    pub fn broadcast(&self, event: &OutboundEvent) -> usize {
        let (delivered, failed) = self.deliver(&self.registry.all_connections(), event);
        self.reap(failed);
        delivered
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.registry.is_online(user_id)
    }

    /// Every online user.
    pub fn online_users(&self) -> Vec<UserId> {
        self.registry.online_users()
    }

    /// Presence of one user.
    pub fn presence_of(&self, user_id: UserId) -> PresenceRecord {
        self.presence
            .record(user_id, self.registry.user_connections(&user_id).len())
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    pub fn user_count(&self) -> usize {
        self.registry.user_count()
    }

    /// End every stream. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let handles = self.registry.all_connections();
        for handle in &handles {
            handle.mark_dead();
        }
        for handle in &handles {
            self.unregister(&handle.id);
        }
        handles.len()
    }

    fn evict_excess(&self, user_id: &UserId) {
        let max = self.config.max_connections_per_user.max(1);
        let connections = self.registry.user_connections(user_id);
        let excess = connections.len().saturating_sub(max);
        for oldest in connections.into_iter().take(excess) {
            if self.registry.remove(&oldest.id).is_some() {
                oldest.mark_dead();
                self.metrics.connection_closed();
                self.metrics.connection_evicted();
                tracing::info!(
                    connection_id = %oldest.id,
                    user_id = %user_id,
                    max,
                    "Evicted oldest connection"
                );
            }
        }
    }

    /// Queue one serialized frame on each handle. Returns the number of
    /// successes and the IDs of handles that must be unregistered.
    fn deliver(
        &self,
        handles: &[Arc<ConnectionHandle>],
        event: &OutboundEvent,
    ) -> (usize, Vec<ConnectionId>) {
        let frame = match to_frame(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(event = event.type_name(), error = %e, "Failed to serialize event");
                return (0, Vec::new());
            }
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for handle in handles {
            match handle.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    if err == SendError::Full {
                        tracing::warn!(
                            connection_id = %handle.id,
                            user_id = %handle.user_id,
                            event = event.type_name(),
                            "Connection not draining, dropping it"
                        );
                    } else {
                        tracing::debug!(
                            connection_id = %handle.id,
                            user_id = %handle.user_id,
                            "Connection already closed"
                        );
                    }
                    handle.mark_dead();
                    self.metrics.delivery_failed();
                    failed.push(handle.id);
                }
            }
        }
        self.metrics.frames_delivered(delivered);
        (delivered, failed)
    }

    fn reap(&self, failed: Vec<ConnectionId>) {
        for conn_id in failed {
            self.unregister(&conn_id);
        }
    }

    fn notify_offline(&self, user_id: UserId) {
        let observers: Vec<Arc<dyn ConnectionObserver>> = {
            let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in observers {
            observer.user_offline(user_id);
        }
    }

    fn lock_transitions(&self) -> MutexGuard<'_, ()> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
