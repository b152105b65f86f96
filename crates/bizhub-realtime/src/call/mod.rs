//! One-call-per-user signaling state machine.

pub mod session;
pub mod signaling;

pub use session::{CallSession, CallStatus, CallType};
pub use signaling::CallSignaling;
