//! Cache and notification coordination around order mutations.
//!
//! The [`OrderCoordinator`] sits between callers and three collaborators:
//! - an [`OrderStore`](order_store::OrderStore), the source of truth
//! - an [`OrderCache`], a shared non-authoritative accelerator
//! - a [`MessagePublisher`], an at-least-once notification channel
//!
//! Store errors always reach the caller. Cache and publisher failures never
//! fail an operation; they are returned as [`Warning`]s on the [`Outcome`].

pub mod commands;
pub mod coordinator;
pub mod error;
pub mod messages;
pub mod outcome;
pub mod services;

pub use commands::{CreateOrder, UpdateOrder};
pub use coordinator::OrderCoordinator;
pub use error::{OrderError, Result};
pub use messages::{
    ORDER_CREATED_TOPIC, ORDER_DELETED_TOPIC, OrderCreatedMessage, OrderDeletedMessage,
    OrderMessage,
};
pub use outcome::{Outcome, Status, Warning};
pub use services::{
    CacheError, ChannelPublisher, DispatchStats, InMemoryOrderCache, InMemoryPublisher, LogSink,
    MessageQueue, MessagePublisher, MessageSink, OrderCache, OrderCacheExt, PublishError,
    PublishedMessage, PublisherConfig, ReadThrough,
};
