//! Message publisher trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::messages::OrderMessage;

/// Errors raised when publishing or delivering a message.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The outgoing queue has no room left.
    #[error("Publish queue is full")]
    QueueFull,

    /// The outgoing queue no longer accepts messages.
    #[error("Publish queue is closed")]
    Closed,

    /// The downstream channel rejected the message.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The message could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fire-and-forget notification channel organized by topic.
///
/// `publish` returns once the message is accepted for delivery, not once
/// it is delivered. Accepted messages are delivered at least once; retries
/// are the publisher's responsibility.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Accepts a message for asynchronous delivery on `topic`.
    async fn publish(&self, topic: &str, message: OrderMessage) -> Result<(), PublishError>;
}

/// A message recorded by [`InMemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub message: OrderMessage,
}

/// In-memory publisher for testing.
///
/// Records every accepted message and can be told to reject publishes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    published: Arc<RwLock<Vec<PublishedMessage>>>,
    fail_on_publish: Arc<AtomicBool>,
}

impl InMemoryPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject publishes.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_on_publish.store(fail, Ordering::SeqCst);
    }

    /// Returns every accepted message, oldest first.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.published.read().await.clone()
    }

    /// Returns the messages accepted on one topic, oldest first.
    pub async fn published_to(&self, topic: &str) -> Vec<OrderMessage> {
        self.published
            .read()
            .await
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.message.clone())
            .collect()
    }

    /// Returns the number of accepted messages.
    pub async fn message_count(&self) -> usize {
        self.published.read().await.len()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, message: OrderMessage) -> Result<(), PublishError> {
        if self.fail_on_publish.load(Ordering::SeqCst) {
            return Err(PublishError::Delivery("Publisher unavailable".to_string()));
        }

        self.published.write().await.push(PublishedMessage {
            topic: topic.to_string(),
            message,
        });
        Ok(())
    }
}
