//! # bizhub-service
//!
//! Business logic service layer for BizHub. Services follow constructor
//! injection: all dependencies are provided at construction time via
//! `Arc` references.

pub mod context;
pub mod messaging;

pub use context::RequestContext;
pub use messaging::{InMemoryMessageStore, MessageStore, MessagingService};
