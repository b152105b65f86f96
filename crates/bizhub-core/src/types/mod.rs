//! Shared domain types.

pub mod id;

pub use id::{CallId, CompanyId, ConnectionId, MessageId, UserId};
