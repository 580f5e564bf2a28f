//! Shared types for the order coordination service.

pub mod order;
pub mod types;

pub use order::{Money, Order, Product};
pub use types::{OrderId, UserId};
