//! Successful operation results and their degraded-mode warnings.

use common::OrderId;
use thiserror::Error;

/// Status of a successful operation, in HTTP terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A new order was created (201).
    Created,
    /// The request succeeded and returns a body (200).
    Ok,
    /// The request succeeded with nothing to return (204).
    NoContent,
}

impl Status {
    /// Returns the HTTP status code for this outcome.
    pub fn code(&self) -> u16 {
        match self {
            Status::Created => 201,
            Status::Ok => 200,
            Status::NoContent => 204,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Created => write!(f, "201 Created"),
            Status::Ok => write!(f, "200 OK"),
            Status::NoContent => write!(f, "204 No Content"),
        }
    }
}

/// A cache or publisher failure that did not fail the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// The cache could not be read; the store was used instead.
    #[error("cache read failed for order {order_id}: {reason}")]
    CacheReadFailure { order_id: OrderId, reason: String },

    /// The cache could not be populated or overwritten.
    #[error("cache write failed for order {order_id}: {reason}")]
    CacheWriteFailure { order_id: OrderId, reason: String },

    /// The cache entry could not be removed.
    #[error("cache invalidation failed for order {order_id}: {reason}")]
    CacheInvalidateFailure { order_id: OrderId, reason: String },

    /// The notification could not be enqueued.
    #[error("publish to {topic} failed: {reason}")]
    PublishFailure { topic: String, reason: String },
}

impl Warning {
    /// Returns true for any of the cache warnings.
    pub fn is_cache(&self) -> bool {
        !matches!(self, Warning::PublishFailure { .. })
    }
}

/// The result of a successful coordinator operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    /// The authoritative result.
    pub value: T,

    /// How the operation completed.
    pub status: Status,

    /// Side-channel failures tolerated along the way.
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, status: Status, warnings: Vec<Warning>) -> Self {
        Self {
            value,
            status,
            warnings,
        }
    }

    /// Returns true if any side-channel failure was tolerated.
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the value, discarding status and warnings.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the value, keeping status and warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            status: self.status,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Status::Created.code(), 201);
        assert_eq!(Status::Ok.code(), 200);
        assert_eq!(Status::NoContent.code(), 204);
    }

    #[test]
    fn outcome_degraded_only_with_warnings() {
        let clean = Outcome::new(1, Status::Ok, vec![]);
        assert!(!clean.is_degraded());

        let degraded = Outcome::new(
            1,
            Status::Ok,
            vec![Warning::PublishFailure {
                topic: "order-created".to_string(),
                reason: "queue full".to_string(),
            }],
        );
        assert!(degraded.is_degraded());
        assert!(!degraded.warnings[0].is_cache());
    }

    #[test]
    fn map_keeps_status_and_warnings() {
        let warning = Warning::CacheWriteFailure {
            order_id: OrderId::new(),
            reason: "down".to_string(),
        };
        let outcome = Outcome::new(2, Status::Created, vec![warning.clone()]).map(|n| n * 2);

        assert_eq!(outcome.value, 4);
        assert_eq!(outcome.status, Status::Created);
        assert_eq!(outcome.warnings, vec![warning]);
    }
}
