//! # bizhub-realtime
//!
//! Real-time relay for BizHub. Provides:
//!
//! - Connection registry keyed by user (multiple tabs/devices per user)
//! - Presence derived from connection lifecycle, with last-seen tracking
//! - Event routing from any producer to every live connection of a user
//! - One-call-per-user signaling state machine with ICE credential handoff
//! - Per-connection heartbeat and stream teardown handling
//!
//! Everything is in-process and in-memory; a restart drops all state.

pub mod call;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod router;
pub mod server;

pub use call::signaling::CallSignaling;
pub use connection::manager::ConnectionManager;
pub use connection::stream::LiveConnection;
pub use presence::tracker::PresenceTracker;
pub use router::EventRouter;
pub use server::{RealtimeEngine, Submission};
