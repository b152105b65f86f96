//! Message persistence.

use async_trait::async_trait;
use tokio::sync::RwLock;

use bizhub_core::error::AppError;
use bizhub_core::types::UserId;
use bizhub_entity::message::{MessageStatus, StoredMessage};

/// Durable storage for chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new message.
    async fn create(&self, message: &StoredMessage) -> Result<(), AppError>;

    /// Flag every `sent` message addressed to `receiver_id` as delivered.
    /// Returns how many changed.
    async fn mark_delivered(&self, receiver_id: UserId) -> Result<usize, AppError>;

    /// Messages exchanged between `a` and `b`, oldest first, at most the
    /// `limit` most recent.
    async fn conversation(
        &self,
        a: UserId,
        b: UserId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, AppError>;
}

/// Process-local message store.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<StoredMessage>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: &StoredMessage) -> Result<(), AppError> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(AppError::conflict(format!(
                "Message {} already exists",
                message.id
            )));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn mark_delivered(&self, receiver_id: UserId) -> Result<usize, AppError> {
        let mut messages = self.messages.write().await;
        let mut updated = 0;
        for message in messages
            .iter_mut()
            .filter(|m| m.receiver_id == receiver_id && m.status == MessageStatus::Sent)
        {
            message.status = MessageStatus::Delivered;
            updated += 1;
        }
        Ok(updated)
    }

    async fn conversation(
        &self,
        a: UserId,
        b: UserId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, AppError> {
        let messages = self.messages.read().await;
        let mut thread: Vec<StoredMessage> = messages
            .iter()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect();
        thread.sort_by_key(|m| m.created_at);
        let skip = thread.len().saturating_sub(limit);
        Ok(thread.split_off(skip))
    }
}
