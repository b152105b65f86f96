//! Chat message sending and history.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use bizhub_core::error::AppError;
use bizhub_core::types::UserId;
use bizhub_entity::message::{MessageStatus, StoredMessage};
use bizhub_realtime::EventRouter;
use bizhub_realtime::message::EventKind;

use super::store::MessageStore;
use crate::context::RequestContext;

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Default and maximum page size for conversation history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Stores chat messages and relays them to the receiver's live streams.
///
/// The store write is the commit point. Relay and the delivered flag are
/// best-effort and never undo it.
#[derive(Debug, Clone)]
pub struct MessagingService {
    store: Arc<dyn MessageStore>,
    router: Arc<EventRouter>,
}

impl MessagingService {
    /// Creates a new messaging service.
    pub fn new(store: Arc<dyn MessageStore>, router: Arc<EventRouter>) -> Self {
        Self { store, router }
    }

    /// Store a message from the current user, then relay `new_message`.
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        receiver_id: UserId,
        content: &str,
    ) -> Result<StoredMessage, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::validation(format!(
                "Message exceeds {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        if receiver_id == ctx.user_id {
            return Err(AppError::validation("Cannot send a message to yourself"));
        }

        let mut message = StoredMessage::new(content.to_string(), ctx.user_id, receiver_id);
        self.store.create(&message).await?;

        let delivered = self.router.deliver(
            EventKind::NewMessage,
            ctx.user_id,
            receiver_id,
            relay_payload(&message),
        );

        if delivered > 0 {
            match self.store.mark_delivered(receiver_id).await {
                Ok(_) => message.status = MessageStatus::Delivered,
                Err(e) => warn!(
                    message_id = %message.id,
                    error = %e,
                    "Failed to mark message delivered"
                ),
            }
        }

        info!(
            message_id = %message.id,
            sender_id = %ctx.user_id,
            receiver_id = %receiver_id,
            delivered,
            "Message sent"
        );
        Ok(message)
    }

    /// The conversation between the current user and `peer_id`.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        peer_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<StoredMessage>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.store.conversation(ctx.user_id, peer_id, limit).await
    }
}

fn relay_payload(message: &StoredMessage) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("messageId".into(), Value::String(message.id.to_string()));
    payload.insert("content".into(), Value::String(message.content.clone()));
    payload.insert(
        "createdAt".into(),
        Value::String(message.created_at.to_rfc3339()),
    );
    payload
}
