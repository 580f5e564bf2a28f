//! Queue-backed publisher with a background dispatcher.
//!
//! [`ChannelPublisher::publish`] only enqueues onto a bounded channel and
//! never waits for delivery. A [`MessageQueue`] task drains the channel into
//! a [`MessageSink`], retrying each message with exponential backoff. The
//! dispatcher stops once every publisher handle has been dropped and the
//! queue is empty.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::messages::OrderMessage;

use super::publisher::{MessagePublisher, PublishError};

/// Downstream destination for dispatched messages.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Delivers one message. Errors are retried by the dispatcher.
    async fn deliver(&self, topic: &str, message: &OrderMessage) -> Result<(), PublishError>;
}

/// Sink that writes each message as a structured log record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn deliver(&self, topic: &str, message: &OrderMessage) -> Result<(), PublishError> {
        let payload = serde_json::to_string(message)?;
        tracing::info!(
            topic,
            order_id = %message.order_id(),
            message_type = message.message_type(),
            %payload,
            "order message delivered"
        );
        Ok(())
    }
}

/// Queue and retry settings for [`ChannelPublisher`].
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Maximum number of messages waiting for delivery.
    pub queue_capacity: usize,

    /// Delivery attempts per message before it is dropped.
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry.
    pub retry_base: Duration,
}

impl PublisherConfig {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.retry_base.saturating_mul(1u32 << exponent)
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_attempts: 5,
            retry_base: Duration::from_millis(50),
        }
    }
}

/// Counters returned by the dispatcher when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub retried: u64,
    pub dropped: u64,
}

#[derive(Debug)]
struct QueuedMessage {
    topic: String,
    message: OrderMessage,
}

/// Publisher that enqueues messages for a background dispatcher.
///
/// Clones share the same queue.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<QueuedMessage>,
}

impl ChannelPublisher {
    /// Creates a publisher and the queue it feeds, without starting delivery.
    pub fn channel(config: PublisherConfig) -> (Self, MessageQueue) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        (Self { sender }, MessageQueue { receiver, config })
    }

    /// Creates a publisher and spawns its dispatcher onto the runtime.
    pub fn spawn<K>(sink: K, config: PublisherConfig) -> (Self, JoinHandle<DispatchStats>)
    where
        K: MessageSink + 'static,
    {
        let (publisher, queue) = Self::channel(config);
        (publisher, queue.spawn(sink))
    }
}

#[async_trait]
impl MessagePublisher for ChannelPublisher {
    async fn publish(&self, topic: &str, message: OrderMessage) -> Result<(), PublishError> {
        self.sender
            .try_send(QueuedMessage {
                topic: topic.to_string(),
                message,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => PublishError::QueueFull,
                TrySendError::Closed(_) => PublishError::Closed,
            })
    }
}

/// Receiving end of a [`ChannelPublisher`].
pub struct MessageQueue {
    receiver: mpsc::Receiver<QueuedMessage>,
    config: PublisherConfig,
}

impl MessageQueue {
    /// Spawns [`run`](Self::run) onto the runtime.
    pub fn spawn<K>(self, sink: K) -> JoinHandle<DispatchStats>
    where
        K: MessageSink + 'static,
    {
        tokio::spawn(self.run(sink))
    }

    /// Delivers queued messages until all publishers are dropped.
    pub async fn run<K: MessageSink>(mut self, sink: K) -> DispatchStats {
        let mut stats = DispatchStats::default();

        while let Some(queued) = self.receiver.recv().await {
            match self.deliver(&sink, &queued).await {
                Ok(attempts) => {
                    stats.delivered += 1;
                    stats.retried += u64::from(attempts - 1);
                    metrics::counter!("order_messages_delivered_total", "topic" => queued.topic.clone())
                        .increment(1);
                }
                Err(e) => {
                    stats.dropped += 1;
                    metrics::counter!("order_messages_dropped_total", "topic" => queued.topic.clone())
                        .increment(1);
                    tracing::error!(
                        topic = %queued.topic,
                        order_id = %queued.message.order_id(),
                        error = %e,
                        "message dropped after exhausting delivery attempts"
                    );
                }
            }
        }

        tracing::info!(
            delivered = stats.delivered,
            retried = stats.retried,
            dropped = stats.dropped,
            "publisher queue drained"
        );
        stats
    }

    /// Returns the number of attempts it took to deliver the message.
    async fn deliver<K: MessageSink>(
        &self,
        sink: &K,
        queued: &QueuedMessage,
    ) -> Result<u32, PublishError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match sink.deliver(&queued.topic, &queued.message).await {
                Ok(()) => return Ok(attempt),
                Err(e) if attempt < max_attempts => {
                    let delay = self.config.backoff(attempt);
                    tracing::warn!(
                        topic = %queued.topic,
                        attempt,
                        error = %e,
                        ?delay,
                        "message delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
