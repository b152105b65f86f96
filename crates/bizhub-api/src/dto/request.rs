//! Request DTOs.

use serde::{Deserialize, Serialize};

use bizhub_core::types::UserId;

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Recipient.
    pub receiver_id: UserId,
    /// Message text.
    pub content: String,
}

/// Query of `GET /api/messages/{peer_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Most recent messages to return.
    pub limit: Option<usize>,
}
