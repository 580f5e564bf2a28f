//! Coordinator error types.

use common::OrderId;
use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced by coordinator operations.
///
/// Only store failures appear here. Cache and publisher failures are
/// reported as [`Warning`](crate::Warning)s instead.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order exists with the given ID.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The request violates a store constraint.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => OrderError::NotFound(id),
            StoreError::Validation(message) => OrderError::Validation(message),
            other => OrderError::Store(other),
        }
    }
}

/// Convenience type alias for coordinator results.
pub type Result<T> = std::result::Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let id = OrderId::new();
        let err = OrderError::from(StoreError::NotFound(id));
        assert!(matches!(err, OrderError::NotFound(missing) if missing == id));
    }

    #[test]
    fn store_validation_maps_to_validation() {
        let err = OrderError::from(StoreError::Validation("bad".to_string()));
        assert!(matches!(err, OrderError::Validation(message) if message == "bad"));
    }
}
