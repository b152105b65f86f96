//! Presence derived from connection lifecycle.

pub mod status;
pub mod tracker;

pub use status::{PresenceRecord, PresenceStatus};
pub use tracker::PresenceTracker;
