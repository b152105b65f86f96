//! Relay metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Relay-wide counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    connections_evicted: AtomicU64,
    events_routed: AtomicU64,
    frames_delivered: AtomicU64,
    delivery_failures: AtomicU64,
    presence_broadcasts: AtomicU64,
    calls_started: AtomicU64,
    calls_finished: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn connection_evicted(&self) {
        self.connections_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_routed(&self) {
        self.events_routed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_delivered(&self, count: usize) {
        self.frames_delivered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn delivery_failed(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn presence_broadcast(&self) {
        self.presence_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn call_started(&self) {
        self.calls_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn call_finished(&self) {
        self.calls_finished.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_evicted: self.connections_evicted.load(Ordering::Relaxed),
            events_routed: self.events_routed.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            presence_broadcasts: self.presence_broadcasts.load(Ordering::Relaxed),
            calls_started: self.calls_started.load(Ordering::Relaxed),
            calls_finished: self.calls_finished.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub connections_total: u64,
    pub connections_active: u64,
    pub connections_evicted: u64,
    pub events_routed: u64,
    pub frames_delivered: u64,
    pub delivery_failures: u64,
    pub presence_broadcasts: u64,
    pub calls_started: u64,
    pub calls_finished: u64,
}
