//! Call session state.

use std::str::FromStr;

use bizhub_core::error::AppError;
use bizhub_core::traits::IceServer;
use bizhub_core::types::id::{CallId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media carried by a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    #[default]
    Audio,
    Video,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl FromStr for CallType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(AppError::validation(format!("Invalid call type: '{other}'"))),
        }
    }
}

/// Where a call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Ringing,
    Connected,
    Ended,
    Rejected,
}

impl CallStatus {
    /// Ringing or connected.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Ringing | Self::Connected)
    }
}

/// One call between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSession {
    pub call_id: CallId,
    pub call_type: CallType,
    pub status: CallStatus,
    pub caller_id: UserId,
    pub receiver_id: UserId,
    pub ice_servers: Vec<IceServer>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl CallSession {
    /// A freshly ringing call.
    pub fn ringing(
        caller_id: UserId,
        receiver_id: UserId,
        call_type: CallType,
        ice_servers: Vec<IceServer>,
    ) -> Self {
        Self {
            call_id: CallId::new(),
            call_type,
            status: CallStatus::Ringing,
            caller_id,
            receiver_id,
            ice_servers,
            started_at: Utc::now(),
            answered_at: None,
            ended_at: None,
        }
    }

    pub fn involves(&self, user_id: &UserId) -> bool {
        self.caller_id == *user_id || self.receiver_id == *user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_party(&self, user_id: &UserId) -> Option<UserId> {
        if self.caller_id == *user_id {
            Some(self.receiver_id)
        } else if self.receiver_id == *user_id {
            Some(self.caller_id)
        } else {
            None
        }
    }

    /// Mark finished with `status`.
    pub fn finish(&mut self, status: CallStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}
