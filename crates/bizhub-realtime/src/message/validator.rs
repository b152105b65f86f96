//! Submitted event validation.

use bizhub_core::error::AppError;
use bizhub_core::types::id::UserId;

use super::types::{EventKind, InboundEvent};

/// Where a validated event goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Every live connection of one user.
    User(UserId),
    /// Every live connection of every user.
    Everyone,
    /// The producer's own connections.
    Sender,
}

/// Reject bodies larger than `max_bytes`.
pub fn validate_size(len: usize, max_bytes: usize) -> Result<(), AppError> {
    if len > max_bytes {
        return Err(AppError::validation(format!(
            "Event too large: {len} bytes (max {max_bytes})"
        )));
    }
    Ok(())
}

/// Resolve the delivery target of a submitted event.
///
/// `connected` only ever echoes to the producer, whatever `receiverId`
/// says. A missing `receiverId` is otherwise only meaningful for
/// `user_status` (broadcast). Heartbeats are server-generated.
pub fn resolve_target(event: &InboundEvent) -> Result<RouteTarget, AppError> {
    match (event.receiver_id, event.kind) {
        (_, EventKind::Heartbeat) => Err(AppError::validation(
            "'heartbeat' events cannot be submitted",
        )),
        (_, EventKind::Connected) => Ok(RouteTarget::Sender),
        (Some(receiver), _) => Ok(RouteTarget::User(receiver)),
        (None, EventKind::UserStatus) => Ok(RouteTarget::Everyone),
        (None, kind) => Err(AppError::validation(format!(
            "receiverId is required for '{kind}' events"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn event(kind: EventKind, receiver: Option<UserId>) -> InboundEvent {
        InboundEvent::new(kind, receiver, Map::new())
    }

    #[test]
    fn test_missing_receiver_rejected_for_directed_types() {
        for kind in [EventKind::NewMessage, EventKind::Typing, EventKind::CallAccept] {
            assert!(resolve_target(&event(kind, None)).is_err());
        }
    }

    #[test]
    fn test_broadcast_and_self_targets() {
        assert_eq!(
            resolve_target(&event(EventKind::UserStatus, None)).unwrap(),
            RouteTarget::Everyone
        );
        assert_eq!(
            resolve_target(&event(EventKind::Connected, None)).unwrap(),
            RouteTarget::Sender
        );
    }

    #[test]
    fn test_connected_never_targets_another_user() {
        assert_eq!(
            resolve_target(&event(EventKind::Connected, Some(UserId::new()))).unwrap(),
            RouteTarget::Sender
        );
    }

    #[test]
    fn test_heartbeat_cannot_be_submitted() {
        assert!(resolve_target(&event(EventKind::Heartbeat, Some(UserId::new()))).is_err());
        assert!(resolve_target(&event(EventKind::Heartbeat, None)).is_err());
    }

    #[test]
    fn test_size_limit() {
        assert!(validate_size(10, 10).is_ok());
        assert!(validate_size(11, 10).is_err());
    }
}
