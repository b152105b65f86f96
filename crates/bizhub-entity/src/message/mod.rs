//! Chat message entities.

pub mod model;

pub use model::{MessageStatus, StoredMessage};
