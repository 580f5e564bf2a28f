//! The order entity and its value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, UserId};

/// Name of the product an order is for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(String);

impl Product {
    /// Creates a product from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the product name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Product {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Product {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Product {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 999 = $9.99)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

/// An order placed by a user.
///
/// `id`, `user_id` and `created_at` never change after creation; the
/// product, quantity and price are replaced by updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product: Product,
    pub quantity: u32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order stamped with the current time.
    pub fn new(
        id: OrderId,
        user_id: UserId,
        product: impl Into<Product>,
        quantity: u32,
        price: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            product: product.into(),
            quantity,
            price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the mutable fields and bumps `updated_at`.
    pub fn apply_update(&mut self, product: Product, price: Money, quantity: u32) {
        self.product = product;
        self.price = price;
        self.quantity = quantity;
        self.updated_at = Utc::now();
    }

    /// Returns the total price for this order (quantity * price).
    pub fn total(&self) -> Money {
        Money::from_cents(self.price.cents() * self.quantity as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_blank_detection() {
        assert!(Product::new("").is_blank());
        assert!(Product::new("   ").is_blank());
        assert!(!Product::new("Widget").is_blank());
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(999).to_string(), "$9.99");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn money_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(999)).unwrap();
        assert_eq!(json, "999");
    }

    #[test]
    fn apply_update_keeps_identity() {
        let mut order = Order::new(
            OrderId::new(),
            UserId::new(),
            "Widget",
            3,
            Money::from_cents(999),
        );
        let id = order.id;
        let user_id = order.user_id;
        let created_at = order.created_at;

        order.apply_update(Product::new("Gadget"), Money::from_cents(500), 1);

        assert_eq!(order.id, id);
        assert_eq!(order.user_id, user_id);
        assert_eq!(order.created_at, created_at);
        assert_eq!(order.product.as_str(), "Gadget");
        assert_eq!(order.quantity, 1);
        assert!(order.updated_at >= created_at);
    }

    #[test]
    fn order_total() {
        let order = Order::new(OrderId::new(), UserId::new(), "Widget", 3, Money::from_cents(999));
        assert_eq!(order.total().cents(), 2997);
    }
}
