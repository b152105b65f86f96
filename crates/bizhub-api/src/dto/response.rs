//! Response DTOs.

use serde::{Deserialize, Serialize};

use bizhub_core::traits::IceServer;
use bizhub_core::types::{CallId, UserId};
use bizhub_realtime::call::CallSession;
use bizhub_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Acknowledgement of a submitted event.
///
/// Acceptance says nothing about delivery; receivers may be offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAccepted {
    /// The event type as understood by the server.
    #[serde(rename = "type")]
    pub kind: String,
    /// Call this event belongs to, for call signaling types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<CallId>,
    /// Resulting call state, for call signaling types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<CallSession>,
}

/// Currently online users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersResponse {
    pub online_users: Vec<UserId>,
    pub count: usize,
}

/// Fresh ICE servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServersResponse {
    pub ice_servers: Vec<IceServer>,
}

/// Basic health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: i64,
}

/// Health check with relay statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: i64,
    /// Live event streams.
    pub connections: usize,
    /// Users with at least one live stream.
    pub online_users: usize,
    /// Calls ringing or connected.
    pub active_calls: usize,
    /// Relay counters.
    pub metrics: MetricsSnapshot,
}
