//! Order coordinator: sequencing of store, cache and publisher calls.

use std::time::Instant;

use common::{Order, OrderId, UserId};
use order_store::{OrderStore, Page, PageRequest};

use crate::commands::{CreateOrder, UpdateOrder};
use crate::error::Result;
use crate::messages::OrderMessage;
use crate::outcome::{Outcome, Status, Warning};
use crate::services::cache::{OrderCache, OrderCacheExt};
use crate::services::publisher::MessagePublisher;

/// Coordinates order mutations across the store, the cache and the publisher.
///
/// The store is always called first and its errors are returned as-is.
/// Cache and publisher calls happen strictly after the store call has
/// committed, and their failures are attached to the [`Outcome`] as
/// warnings instead of failing the operation.
///
/// # Consistency
///
/// The cache is last-write-wins with no versioning. A read whose store
/// fetch races an update's store write can repopulate the cache with the
/// pre-update order after the update has written through. The entry stays
/// stale until the next update, delete or eviction.
pub struct OrderCoordinator<S, C, P>
where
    S: OrderStore,
    C: OrderCache,
    P: MessagePublisher,
{
    store: S,
    cache: C,
    publisher: P,
}

impl<S, C, P> OrderCoordinator<S, C, P>
where
    S: OrderStore,
    C: OrderCache,
    P: MessagePublisher,
{
    /// Creates a new coordinator.
    pub fn new(store: S, cache: C, publisher: P) -> Self {
        Self {
            store,
            cache,
            publisher,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Creates an order under a freshly generated ID.
    ///
    /// The order exists once the store accepts it. The cache is then
    /// populated and an `order-created` message is published.
    #[tracing::instrument(skip(self, command), fields(user_id = %command.user_id))]
    pub async fn create_order(&self, command: CreateOrder) -> Result<Outcome<Order>> {
        let started = Instant::now();
        let id = OrderId::new();

        let order = self
            .store
            .create(
                id,
                command.user_id,
                command.product,
                command.quantity,
                command.price,
            )
            .await?;

        let mut warnings = Vec::new();
        self.write_cache(&order, &mut warnings).await;
        self.publish(OrderMessage::created(&order), &mut warnings)
            .await;

        metrics::counter!("orders_created_total").increment(1);
        record_duration("create", started);
        tracing::info!(order_id = %order.id, degraded = !warnings.is_empty(), "order created");

        Ok(Outcome::new(order, Status::Created, warnings))
    }

    /// Reads one order through the cache.
    ///
    /// A cache hit never touches the store. On a miss the store result is
    /// cached before returning; a missing order is not cached.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Outcome<Order>> {
        let started = Instant::now();

        let lookup = self
            .cache
            .compute_if_absent(id, |id| self.store.find_by_id(id))
            .await?;

        if lookup.hit {
            metrics::counter!("order_cache_hits_total").increment(1);
        } else {
            metrics::counter!("order_cache_misses_total").increment(1);
        }

        let mut warnings = Vec::new();
        if let Some(e) = lookup.read_error {
            degrade(
                &mut warnings,
                Warning::CacheReadFailure {
                    order_id: id,
                    reason: e.to_string(),
                },
            );
        }
        if let Some(e) = lookup.write_error {
            degrade(
                &mut warnings,
                Warning::CacheWriteFailure {
                    order_id: id,
                    reason: e.to_string(),
                },
            );
        }

        record_duration("get", started);
        Ok(Outcome::new(lookup.order, Status::Ok, warnings))
    }

    /// Reads one page of a user's orders straight from the store.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Outcome<Page<Order>>> {
        let started = Instant::now();
        let page = self.store.find_page_by_owner(user_id, request).await?;

        record_duration("list", started);
        Ok(Outcome::new(page, Status::Ok, Vec::new()))
    }

    /// Replaces an order's mutable fields and writes the result through to
    /// the cache. Updates are not published.
    #[tracing::instrument(skip(self, command), fields(order_id = %command.order_id))]
    pub async fn update_order(&self, command: UpdateOrder) -> Result<Outcome<Order>> {
        let started = Instant::now();

        let order = self
            .store
            .update(
                command.order_id,
                command.product,
                command.price,
                command.quantity,
            )
            .await?;

        let mut warnings = Vec::new();
        self.write_cache(&order, &mut warnings).await;

        record_duration("update", started);
        tracing::info!(order_id = %order.id, degraded = !warnings.is_empty(), "order updated");

        Ok(Outcome::new(order, Status::Ok, warnings))
    }

    /// Deletes an order, invalidates its cache entry and publishes an
    /// `order-deleted` message.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<Outcome<()>> {
        let started = Instant::now();

        self.store.delete(id).await?;

        let mut warnings = Vec::new();
        if let Err(e) = self.cache.remove(id).await {
            degrade(
                &mut warnings,
                Warning::CacheInvalidateFailure {
                    order_id: id,
                    reason: e.to_string(),
                },
            );
        }
        self.publish(OrderMessage::deleted(id), &mut warnings).await;

        metrics::counter!("orders_deleted_total").increment(1);
        record_duration("delete", started);
        tracing::info!(order_id = %id, degraded = !warnings.is_empty(), "order deleted");

        Ok(Outcome::new((), Status::NoContent, warnings))
    }

    async fn write_cache(&self, order: &Order, warnings: &mut Vec<Warning>) {
        if let Err(e) = self.cache.put(order.id, order).await {
            degrade(
                warnings,
                Warning::CacheWriteFailure {
                    order_id: order.id,
                    reason: e.to_string(),
                },
            );
        }
    }

    async fn publish(&self, message: OrderMessage, warnings: &mut Vec<Warning>) {
        let topic = message.topic();
        if let Err(e) = self.publisher.publish(topic, message).await {
            degrade(
                warnings,
                Warning::PublishFailure {
                    topic: topic.to_string(),
                    reason: e.to_string(),
                },
            );
        }
    }
}

fn degrade(warnings: &mut Vec<Warning>, warning: Warning) {
    if warning.is_cache() {
        metrics::counter!("order_cache_failures_total").increment(1);
    } else {
        metrics::counter!("order_publish_failures_total").increment(1);
    }
    tracing::warn!(%warning, "continuing in degraded mode");
    warnings.push(warning);
}

fn record_duration(operation: &'static str, started: Instant) {
    metrics::histogram!("order_operation_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
