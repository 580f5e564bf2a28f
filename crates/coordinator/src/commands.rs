//! Requests accepted by the coordinator.

use common::{Money, OrderId, Product, UserId};

/// Request to create an order for a user.
///
/// The order ID is generated by the coordinator, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub user_id: UserId,
    pub product: Product,
    pub quantity: u32,
    pub price: Money,
}

impl CreateOrder {
    pub fn new(user_id: UserId, product: impl Into<Product>, quantity: u32, price: Money) -> Self {
        Self {
            user_id,
            product: product.into(),
            quantity,
            price,
        }
    }
}

/// Request to replace the mutable fields of an existing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOrder {
    pub order_id: OrderId,
    pub product: Product,
    pub price: Money,
    pub quantity: u32,
}

impl UpdateOrder {
    pub fn new(order_id: OrderId, product: impl Into<Product>, price: Money, quantity: u32) -> Self {
        Self {
            order_id,
            product: product.into(),
            price,
            quantity,
        }
    }
}
