//! Presence status definitions.

use bizhub_core::types::id::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a user has at least one live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// One or more live connections.
    Online,
    /// No live connections.
    Offline,
}

impl PresenceStatus {
    /// Status for a given online flag.
    pub fn from_online(online: bool) -> Self {
        if online { Self::Online } else { Self::Offline }
    }
}

/// Presence of a single user as reported by the query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub status: PresenceStatus,
    /// Number of live connections.
    pub connections: usize,
    /// When the user last went offline, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}
