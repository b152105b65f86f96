//! Periodic `heartbeat` frames for each live stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use super::handle::ConnectionHandle;
use crate::message::serializer::to_frame;
use crate::message::types::OutboundEvent;

/// Push a `heartbeat` every `interval` until the connection dies.
///
/// A failed send marks the connection dead, which ends its stream and
/// lets the stream's guard unregister it.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, interval: Duration) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = ticker.tick() => {}
        }

        let frame = match to_frame(&OutboundEvent::heartbeat()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize heartbeat");
                continue;
            }
        };

        if let Err(err) = handle.send(frame) {
            tracing::debug!(
                connection_id = %handle.id,
                error = %err,
                "Heartbeat send failed, marking dead"
            );
            handle.mark_dead();
            break;
        }
    }

    tracing::trace!(connection_id = %handle.id, "Heartbeat stopped");
}
