//! Individual event stream handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bizhub_core::types::id::{ConnectionId, UserId};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The connection has been marked dead.
    #[error("connection is closed")]
    Closed,
    /// The client is not draining its stream.
    #[error("connection buffer is full")]
    Full,
}

/// A handle to a single live event stream.
///
/// Holds the sender side of the stream's outbound buffer plus the
/// cancellation token that ends the stream when the handle is killed.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<Arc<str>>,
    alive: AtomicBool,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, sender: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            shutdown: CancellationToken::new(),
        }
    }

    /// Queue a serialized frame without waiting.
    pub fn send(&self, frame: Arc<str>) -> Result<(), SendError> {
        if !self.is_alive() {
            return Err(SendError::Closed);
        }
        self.sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Whether the connection is still considered alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire) && !self.sender.is_closed()
    }

    /// Mark the connection dead and end its stream.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Release);
        self.shutdown.cancel();
    }

    /// Resolves once the connection has been marked dead.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// Connection duration in seconds
    pub fn duration_secs(&self) -> i64 {
        (Utc::now() - self.connected_at).num_seconds()
    }
}
