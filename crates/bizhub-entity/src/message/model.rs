//! Stored chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizhub_core::types::{MessageId, UserId};

/// Delivery status of a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Stored, not yet pushed to a live connection.
    Sent,
    /// Pushed to at least one of the receiver's live connections.
    Delivered,
    /// Opened by the receiver.
    Read,
}

impl MessageStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

/// A chat message as persisted by the message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Unique message identifier.
    pub id: MessageId,
    /// Message body.
    pub content: String,
    /// Author.
    pub sender_id: UserId,
    /// Recipient.
    pub receiver_id: UserId,
    /// Delivery status.
    pub status: MessageStatus,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Create a freshly stored message in the `sent` state.
    pub fn new(content: String, sender_id: UserId, receiver_id: UserId) -> Self {
        Self {
            id: MessageId::new(),
            content,
            sender_id,
            receiver_id,
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        }
    }

    /// Whether the message belongs to the conversation between `a` and `b`.
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}
