//! Connection lifecycle: handles, registry, manager, heartbeat, and stream teardown.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod registry;
pub mod stream;

pub use handle::{ConnectionHandle, SendError};
pub use manager::{ConnectionManager, ConnectionObserver};
pub use registry::ConnectionRegistry;
pub use stream::LiveConnection;
