//! Notification messages published for order mutations.

use common::{Money, Order, OrderId, Product, UserId};
use serde::{Deserialize, Serialize};

/// Topic carrying [`OrderMessage::OrderCreated`].
pub const ORDER_CREATED_TOPIC: &str = "order-created";

/// Topic carrying [`OrderMessage::OrderDeleted`].
pub const ORDER_DELETED_TOPIC: &str = "order-deleted";

/// Messages emitted to downstream consumers.
///
/// Updates are not notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderMessage {
    /// An order was created. Carries a full snapshot.
    OrderCreated(OrderCreatedMessage),

    /// An order was deleted. Carries only the ID.
    OrderDeleted(OrderDeletedMessage),
}

/// Payload for the order-created topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedMessage {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub product: Product,
    pub quantity: u32,
    pub price: Money,
}

/// Payload for the order-deleted topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDeletedMessage {
    pub order_id: OrderId,
}

impl OrderMessage {
    /// Builds the created message from the stored order.
    pub fn created(order: &Order) -> Self {
        OrderMessage::OrderCreated(OrderCreatedMessage {
            order_id: order.id,
            user_id: order.user_id,
            product: order.product.clone(),
            quantity: order.quantity,
            price: order.price,
        })
    }

    /// Builds the deleted message.
    pub fn deleted(order_id: OrderId) -> Self {
        OrderMessage::OrderDeleted(OrderDeletedMessage { order_id })
    }

    /// The topic this message is designated for.
    pub fn topic(&self) -> &'static str {
        match self {
            OrderMessage::OrderCreated(_) => ORDER_CREATED_TOPIC,
            OrderMessage::OrderDeleted(_) => ORDER_DELETED_TOPIC,
        }
    }

    /// The order the message is about.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderMessage::OrderCreated(data) => data.order_id,
            OrderMessage::OrderDeleted(data) => data.order_id,
        }
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            OrderMessage::OrderCreated(_) => "OrderCreated",
            OrderMessage::OrderDeleted(_) => "OrderDeleted",
        }
    }
}
