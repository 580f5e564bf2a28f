//! Cache and publisher collaborators with in-memory implementations.

pub mod cache;
pub mod channel;
pub mod publisher;

pub use cache::{CacheError, CacheStats, InMemoryOrderCache, OrderCache, OrderCacheExt, ReadThrough};
pub use channel::{
    ChannelPublisher, DispatchStats, LogSink, MessageQueue, MessageSink, PublisherConfig,
};
pub use publisher::{InMemoryPublisher, MessagePublisher, PublishError, PublishedMessage};
