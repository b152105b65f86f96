//! Event types, serialization, and submission validation.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{EventKind, InboundEvent, OutboundEvent, RelayedEvent, SystemEvent};
