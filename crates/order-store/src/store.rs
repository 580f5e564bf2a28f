use async_trait::async_trait;

use crate::{Money, Order, OrderId, Page, PageRequest, Product, Result, StoreError, UserId};

/// Core trait for durable order storage.
///
/// The store is the source of truth for orders. Every mutation is atomic:
/// it either commits completely or leaves the stored order untouched.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order with a caller-generated ID.
    ///
    /// Fails with `Validation` if the fields violate store constraints.
    async fn create(
        &self,
        id: OrderId,
        user_id: UserId,
        product: Product,
        quantity: u32,
        price: Money,
    ) -> Result<Order>;

    /// Loads an order by ID.
    ///
    /// Fails with `NotFound` if no such order exists.
    async fn find_by_id(&self, id: OrderId) -> Result<Order>;

    /// Loads one page of a user's orders.
    ///
    /// Orders are returned oldest first; the ordering is stable across calls.
    async fn find_page_by_owner(&self, user_id: UserId, request: PageRequest)
    -> Result<Page<Order>>;

    /// Replaces the mutable fields of an order and returns the new state.
    ///
    /// Fails with `NotFound` or `Validation`.
    async fn update(
        &self,
        id: OrderId,
        product: Product,
        price: Money,
        quantity: u32,
    ) -> Result<Order>;

    /// Deletes an order.
    ///
    /// Fails with `NotFound` if no such order exists.
    async fn delete(&self, id: OrderId) -> Result<()>;
}

/// Validates order fields before they are written.
pub fn validate_order_fields(product: &Product, quantity: u32, price: Money) -> Result<()> {
    if product.is_blank() {
        return Err(StoreError::Validation(
            "Product must not be empty".to_string(),
        ));
    }

    if quantity == 0 {
        return Err(StoreError::Validation(format!(
            "Invalid quantity: {quantity} (must be greater than 0)"
        )));
    }

    if !price.is_positive() {
        return Err(StoreError::Validation(format!(
            "Invalid price: {price} (must be greater than 0)"
        )));
    }

    Ok(())
}
