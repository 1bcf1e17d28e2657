//! Domain error types.

use common::{Money, ProductId};
use store::{CacheError, StoreError};
use thiserror::Error;

/// Errors returned by the application services.
///
/// Only these variants are visible to callers. Storage, cache and codec
/// failures are logged where they happen and collapse into
/// [`DomainError::Internal`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The requested record does not exist.
    #[error("Record not found")]
    NotFound,

    /// A uniqueness rule was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An order line asks for more units than are in stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The amount paid does not cover the order total.
    #[error("Insufficient payment: total price is {total_price}, paid {total_paid}")]
    InsufficientPayment { total_price: Money, total_paid: Money },

    /// A line or order total does not fit the stored money columns.
    #[error("Amount exceeds the largest supported value")]
    AmountOutOfRange,

    /// An update carried no change.
    #[error("No data to update")]
    NoUpdatedData,

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Any other failure.
    #[error("Internal error")]
    Internal,
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::Conflict(what) => DomainError::Conflict(what),
            other => {
                tracing::error!(error = %other, "store operation failed");
                DomainError::Internal
            }
        }
    }
}

impl From<CacheError> for DomainError {
    fn from(err: CacheError) -> Self {
        tracing::error!(error = %err, "cache operation failed");
        DomainError::Internal
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_and_conflict_survive() {
        assert_eq!(DomainError::from(StoreError::NotFound), DomainError::NotFound);
        assert_eq!(
            DomainError::from(StoreError::Conflict("categories_name_key".into())),
            DomainError::Conflict("categories_name_key".into())
        );
    }

    #[test]
    fn other_failures_collapse_to_internal() {
        let err = DomainError::from(StoreError::Unavailable("down".into()));
        assert_eq!(err, DomainError::Internal);
        assert_eq!(err.to_string(), "Internal error");

        let err = DomainError::from(CacheError::Unavailable("down".into()));
        assert_eq!(err, DomainError::Internal);
    }
}
