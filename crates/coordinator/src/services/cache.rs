//! Order cache trait and in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use common::{Order, OrderId};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache could not be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A shared key-value cache of orders.
///
/// The cache is never authoritative. Each call is atomic per key; there is
/// no cross-key consistency and no versioning, so concurrent writers to the
/// same key resolve last-write-wins.
#[async_trait]
pub trait OrderCache: Send + Sync {
    /// Returns the cached order, or None on a miss.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, CacheError>;

    /// Stores an order, overwriting any existing entry.
    async fn put(&self, id: OrderId, order: &Order) -> Result<(), CacheError>;

    /// Removes an entry. Removing a missing key is not an error.
    async fn remove(&self, id: OrderId) -> Result<(), CacheError>;
}

/// Result of a read-through lookup.
#[derive(Debug)]
pub struct ReadThrough {
    /// The order, from the cache or from the fallback.
    pub order: Order,

    /// True if the order came from the cache.
    pub hit: bool,

    /// Set when the cache read failed and the fallback was used.
    pub read_error: Option<CacheError>,

    /// Set when populating the cache after the fallback failed.
    pub write_error: Option<CacheError>,
}

/// Extension trait providing read-through on top of any cache.
#[async_trait]
pub trait OrderCacheExt: OrderCache {
    /// Returns the cached order, or loads it with `fallback` and caches it.
    ///
    /// Fallback errors are returned unchanged and nothing is cached for
    /// them, so a missing order is never remembered as absent. Cache
    /// failures never fail the lookup: a failed read is treated as a miss
    /// and a failed populate still returns the loaded order. Both are
    /// reported on the [`ReadThrough`].
    ///
    /// Concurrent lookups of the same cold key may each run the fallback.
    async fn compute_if_absent<F, Fut, E>(
        &self,
        id: OrderId,
        fallback: F,
    ) -> Result<ReadThrough, E>
    where
        F: FnOnce(OrderId) -> Fut + Send,
        Fut: Future<Output = Result<Order, E>> + Send,
        E: Send,
    {
        let read_error = match self.get(id).await {
            Ok(Some(order)) => {
                return Ok(ReadThrough {
                    order,
                    hit: true,
                    read_error: None,
                    write_error: None,
                });
            }
            Ok(None) => None,
            Err(e) => Some(e),
        };

        let order = fallback(id).await?;
        let write_error = self.put(id, &order).await.err();

        Ok(ReadThrough {
            order,
            hit: false,
            read_error,
            write_error,
        })
    }
}

// Blanket implementation for all OrderCache implementations
impl<T: OrderCache + ?Sized> OrderCacheExt for T {}

/// Hit and miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory cache for testing and single-node use.
///
/// Values are stored JSON-encoded so every read returns a fresh copy, as a
/// networked cache would. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderCache {
    entries: Arc<RwLock<HashMap<OrderId, serde_json::Value>>>,
    unavailable: Arc<AtomicBool>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl InMemoryOrderCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Returns true if the key is cached, ignoring availability.
    pub async fn contains(&self, id: OrderId) -> bool {
        self.entries.read().await.contains_key(&id)
    }

    /// Returns hit and miss counts for `get`.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
        }
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable(
                "in-memory cache marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderCache for InMemoryOrderCache {
    async fn get(&self, id: OrderId) -> Result<Option<Order>, CacheError> {
        self.check_available()?;

        let entries = self.entries.read().await;
        match entries.get(&id) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::SeqCst);
                Ok(Some(serde_json::from_value(value.clone())?))
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }
    }

    async fn put(&self, id: OrderId, order: &Order) -> Result<(), CacheError> {
        self.check_available()?;

        let value = serde_json::to_value(order)?;
        self.entries.write().await.insert(id, value);
        Ok(())
    }

    async fn remove(&self, id: OrderId) -> Result<(), CacheError> {
        self.check_available()?;

        self.entries.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, UserId};

    fn sample_order() -> Order {
        Order::new(
            OrderId::new(),
            UserId::new(),
            "Widget",
            3,
            Money::from_cents(999),
        )
    }

    #[tokio::test]
    async fn put_get_remove() {
        let cache = InMemoryOrderCache::new();
        let order = sample_order();

        assert!(cache.get(order.id).await.unwrap().is_none());

        cache.put(order.id, &order).await.unwrap();
        assert_eq!(cache.get(order.id).await.unwrap(), Some(order.clone()));

        cache.remove(order.id).await.unwrap();
        assert!(cache.get(order.id).await.unwrap().is_none());

        // Removing again is a no-op
        cache.remove(order.id).await.unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[tokio::test]
    async fn unavailable_cache_fails_every_call() {
        let cache = InMemoryOrderCache::new();
        let order = sample_order();
        cache.put(order.id, &order).await.unwrap();
        cache.set_unavailable(true);

        assert!(matches!(
            cache.get(order.id).await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(cache.put(order.id, &order).await.is_err());
        assert!(cache.remove(order.id).await.is_err());
        assert!(cache.contains(order.id).await);

        cache.set_unavailable(false);
        assert!(cache.get(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn compute_if_absent_hit_skips_fallback() {
        let cache = InMemoryOrderCache::new();
        let order = sample_order();
        cache.put(order.id, &order).await.unwrap();

        let result = cache
            .compute_if_absent(order.id, |_| async {
                Err::<Order, &str>("fallback must not run")
            })
            .await
            .unwrap();

        assert!(result.hit);
        assert_eq!(result.order, order);
    }

    #[tokio::test]
    async fn compute_if_absent_miss_loads_and_populates() {
        let cache = InMemoryOrderCache::new();
        let order = sample_order();
        let loaded = order.clone();

        let result = cache
            .compute_if_absent(order.id, |_| async move { Ok::<_, &str>(loaded) })
            .await
            .unwrap();

        assert!(!result.hit);
        assert!(result.read_error.is_none());
        assert!(result.write_error.is_none());
        assert_eq!(cache.get(order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn compute_if_absent_does_not_cache_errors() {
        let cache = InMemoryOrderCache::new();
        let id = OrderId::new();

        let result = cache
            .compute_if_absent(id, |_| async { Err::<Order, &str>("missing") })
            .await;

        assert_eq!(result.unwrap_err(), "missing");
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn compute_if_absent_tolerates_unavailable_cache() {
        let cache = InMemoryOrderCache::new();
        cache.set_unavailable(true);
        let order = sample_order();
        let loaded = order.clone();

        let result = cache
            .compute_if_absent(order.id, |_| async move { Ok::<_, &str>(loaded) })
            .await
            .unwrap();

        assert!(!result.hit);
        assert_eq!(result.order, order);
        assert!(matches!(result.read_error, Some(CacheError::Unavailable(_))));
        assert!(matches!(result.write_error, Some(CacheError::Unavailable(_))));
    }

    #[test]
    fn hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
        assert_eq!(CacheStats { hits: 3, misses: 1 }.hit_rate(), 0.75);
    }
}
