//! Route handlers organized by domain.

pub mod calls;
pub mod events;
pub mod health;
pub mod messages;
pub mod presence;
pub mod stream;
