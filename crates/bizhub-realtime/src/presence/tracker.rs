//! Presence tracker: last-seen bookkeeping and `user_status` event building.

use bizhub_core::types::id::UserId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::status::{PresenceRecord, PresenceStatus};
use crate::message::types::{OutboundEvent, SystemEvent};

/// Records when users go offline and builds presence transition events.
///
/// Online-ness itself is not stored here; it is derived from the
/// connection registry so the two can never disagree.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    last_seen: DashMap<UserId, DateTime<Utc>>,
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the event announcing `user_id` came online.
    pub fn went_online(&self, user_id: UserId, online_users: Vec<UserId>) -> OutboundEvent {
        OutboundEvent::System(SystemEvent::UserStatus {
            user_id,
            status: PresenceStatus::Online,
            online_users,
            last_seen: None,
            timestamp: Utc::now(),
        })
    }

    /// Record `user_id` going offline now and build the announcing event.
    pub fn went_offline(&self, user_id: UserId, online_users: Vec<UserId>) -> OutboundEvent {
        let now = Utc::now();
        self.last_seen.insert(user_id, now);
        OutboundEvent::System(SystemEvent::UserStatus {
            user_id,
            status: PresenceStatus::Offline,
            online_users,
            last_seen: Some(now),
            timestamp: now,
        })
    }

    /// When `user_id` last went offline.
    pub fn last_seen(&self, user_id: &UserId) -> Option<DateTime<Utc>> {
        self.last_seen.get(user_id).map(|entry| *entry.value())
    }

    /// Combine registry state with last-seen into a record.
    pub fn record(&self, user_id: UserId, connections: usize) -> PresenceRecord {
        PresenceRecord {
            user_id,
            status: PresenceStatus::from_online(connections > 0),
            connections,
            last_seen: self.last_seen(&user_id),
        }
    }
}
