//! A live event stream bound to the registry for its whole lifetime.

use std::sync::Arc;

use bizhub_core::types::id::{ConnectionId, UserId};
use futures::Stream;
use tokio::sync::mpsc;

use super::handle::ConnectionHandle;
use super::manager::ConnectionManager;

/// Unregisters the connection when the stream is dropped, whether the
/// client went away or the connection was killed server-side.
struct DisconnectGuard {
    manager: Arc<ConnectionManager>,
    conn_id: ConnectionId,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.manager.unregister(&self.conn_id);
    }
}

/// The receiving side of one registered connection.
pub struct LiveConnection {
    handle: Arc<ConnectionHandle>,
    receiver: mpsc::Receiver<Arc<str>>,
    _guard: DisconnectGuard,
}

impl LiveConnection {
    pub(crate) fn new(
        manager: Arc<ConnectionManager>,
        handle: Arc<ConnectionHandle>,
        receiver: mpsc::Receiver<Arc<str>>,
    ) -> Self {
        let conn_id = handle.id;
        Self {
            handle,
            receiver,
            _guard: DisconnectGuard { manager, conn_id },
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.handle.id
    }

    pub fn user_id(&self) -> UserId {
        self.handle.user_id
    }

    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Next frame, or `None` once the connection has been killed.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        tokio::select! {
            biased;
            frame = self.receiver.recv() => frame,
            _ = self.handle.closed() => None,
        }
    }

    /// Take an already queued frame without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.receiver.try_recv().ok()
    }

    /// Turn into a stream of serialized frames. Dropping the stream
    /// unregisters the connection.
    pub fn into_stream(self) -> impl Stream<Item = Arc<str>> + Send + 'static {
        futures::stream::unfold(self, |mut conn| async move {
            let frame = conn.recv().await?;
            Some((frame, conn))
        })
    }
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConnection")
            .field("id", &self.handle.id)
            .field("user_id", &self.handle.user_id)
            .finish()
    }
}
