//! Inbound and outbound event type definitions.

use bizhub_core::error::AppError;
use bizhub_core::types::id::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::presence::status::PresenceStatus;

/// Keys the server owns on every relayed event. Submitted values are dropped.
pub const RESERVED_KEYS: [&str; 4] = ["type", "senderId", "receiverId", "timestamp"];

/// The closed set of event types that flow through the relay.
///
/// Hyphenated spellings (`call-initiate`) are accepted on input; output
/// always uses snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// First frame on every stream.
    #[serde(alias = "connection_established", alias = "connection-established")]
    Connected,
    /// Periodic liveness frame.
    Heartbeat,
    /// A chat message notification.
    #[serde(alias = "new-message")]
    NewMessage,
    /// Typing indicator.
    Typing,
    /// Presence transition.
    #[serde(alias = "user-status")]
    UserStatus,
    /// Offer to start a call.
    #[serde(alias = "call-initiate")]
    CallInitiate,
    /// Callee accepted.
    #[serde(alias = "call-accept")]
    CallAccept,
    /// Callee declined.
    #[serde(alias = "call-reject")]
    CallReject,
    /// Either party hung up, or a party dropped.
    #[serde(alias = "call-end")]
    CallEnd,
    /// Trickled ICE candidate.
    #[serde(alias = "call-ice-candidate", alias = "call_ice", alias = "call-ice")]
    CallIceCandidate,
    /// Opaque application event relayed as-is.
    Relay,
}

impl EventKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Heartbeat => "heartbeat",
            Self::NewMessage => "new_message",
            Self::Typing => "typing",
            Self::UserStatus => "user_status",
            Self::CallInitiate => "call_initiate",
            Self::CallAccept => "call_accept",
            Self::CallReject => "call_reject",
            Self::CallEnd => "call_end",
            Self::CallIceCandidate => "call_ice_candidate",
            Self::Relay => "relay",
        }
    }

    /// Whether this type drives the call state machine.
    pub fn is_call_signal(&self) -> bool {
        matches!(
            self,
            Self::CallInitiate
                | Self::CallAccept
                | Self::CallReject
                | Self::CallEnd
                | Self::CallIceCandidate
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event submitted by an authenticated producer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Event type.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Target user. Optional only for broadcast and self-directed types.
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    /// Everything else, forwarded verbatim.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl InboundEvent {
    /// Build an event programmatically.
    pub fn new(kind: EventKind, receiver_id: Option<UserId>, payload: Map<String, Value>) -> Self {
        let mut event = Self {
            kind,
            receiver_id,
            payload,
        };
        event.strip_reserved();
        event
    }

    /// Parse a submitted JSON body.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let mut event: Self = serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("Malformed event: {e}")))?;
        event.strip_reserved();
        Ok(event)
    }

    fn strip_reserved(&mut self) {
        for key in RESERVED_KEYS {
            self.payload.remove(key);
        }
    }
}

/// A producer's event as delivered to its receiver, stamped by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedEvent {
    /// Event type.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Authenticated producer.
    pub sender_id: UserId,
    /// Target user; absent on broadcasts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<UserId>,
    /// Server time at routing.
    pub timestamp: DateTime<Utc>,
    /// Producer fields.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Events generated by the server itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SystemEvent {
    /// Stream opened.
    Connected {
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },
    /// Liveness.
    Heartbeat { timestamp: DateTime<Utc> },
    /// A user came online or went offline.
    UserStatus {
        user_id: UserId,
        status: PresenceStatus,
        online_users: Vec<UserId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_seen: Option<DateTime<Utc>>,
        timestamp: DateTime<Utc>,
    },
}

/// Anything written to a stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    /// Server-generated.
    System(SystemEvent),
    /// Producer-originated.
    Relayed(RelayedEvent),
}

impl OutboundEvent {
    /// A `connected` frame for `user_id`.
    pub fn connected(user_id: UserId) -> Self {
        Self::System(SystemEvent::Connected {
            user_id,
            timestamp: Utc::now(),
        })
    }

    /// A `heartbeat` frame.
    pub fn heartbeat() -> Self {
        Self::System(SystemEvent::Heartbeat {
            timestamp: Utc::now(),
        })
    }

    /// Stamp a producer payload with sender and server time.
    pub fn relayed(
        kind: EventKind,
        sender_id: UserId,
        receiver_id: Option<UserId>,
        mut payload: Map<String, Value>,
    ) -> Self {
        for key in RESERVED_KEYS {
            payload.remove(key);
        }
        Self::Relayed(RelayedEvent {
            kind,
            sender_id,
            receiver_id,
            timestamp: Utc::now(),
            payload,
        })
    }

    /// Wire type name, for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::System(SystemEvent::Connected { .. }) => EventKind::Connected.as_str(),
            Self::System(SystemEvent::Heartbeat { .. }) => EventKind::Heartbeat.as_str(),
            Self::System(SystemEvent::UserStatus { .. }) => EventKind::UserStatus.as_str(),
            Self::Relayed(relayed) => relayed.kind.as_str(),
        }
    }
}
