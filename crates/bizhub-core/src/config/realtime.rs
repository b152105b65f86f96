//! Real-time event stream configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (server-sent events) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum simultaneous streams per user; the oldest is closed beyond this.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Per-connection outbound buffer size. Values below 2 are raised to 2.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Interval between `heartbeat` events pushed to each connection.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Interval between SSE keepalive comment lines.
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_seconds: u64,
    /// Maximum accepted size of a submitted event body.
    #[serde(default = "default_max_event_size")]
    pub max_event_size_bytes: usize,
}

impl RealtimeConfig {
    /// Heartbeat interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds.max(1))
    }

    /// Keepalive interval as a [`Duration`].
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_seconds.max(1))
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            keepalive_interval_seconds: default_keepalive_interval(),
            max_event_size_bytes: default_max_event_size(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    10
}

fn default_channel_buffer() -> usize {
    256
}

fn default_heartbeat_interval() -> u64 {
    25
}

fn default_keepalive_interval() -> u64 {
    15
}

fn default_max_event_size() -> usize {
    65_536
}
