//! Chat messaging: durable store first, best-effort relay second.

pub mod service;
pub mod store;

pub use service::MessagingService;
pub use store::{InMemoryMessageStore, MessageStore};
