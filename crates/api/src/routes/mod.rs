//! HTTP route handlers.

pub mod categories;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

use common::{Money, Pagination};
use serde::Deserialize;

use crate::error::ApiError;

/// `?skip=&limit=` query of list endpoints. `skip` is the 1-based page.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ListQuery {
    pub fn pagination(&self) -> Result<Pagination, ApiError> {
        pagination(self.skip, self.limit)
    }
}

pub(crate) fn pagination(skip: Option<u64>, limit: Option<u64>) -> Result<Pagination, ApiError> {
    let default = Pagination::default();
    let skip = skip.unwrap_or(default.skip);
    let limit = limit.unwrap_or(default.limit);
    if skip == 0 {
        return Err(ApiError::BadRequest("skip must be at least 1".to_string()));
    }
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
    }
    Ok(Pagination::new(skip, limit))
}

/// Rejects a blank required text field.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

/// Rejects a negative amount or one the money columns cannot hold.
pub(crate) fn require_amount(field: &str, value: Money) -> Result<(), ApiError> {
    if value.is_negative() {
        return Err(ApiError::BadRequest(format!("{field} must not be negative")));
    }
    if !value.is_storable() {
        return Err(ApiError::BadRequest(format!(
            "{field} must not exceed {}",
            Money::max_storable()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(ListQuery::default().pagination().unwrap(), Pagination::new(1, 10));
        assert_eq!(pagination(Some(3), Some(5)).unwrap(), Pagination::new(3, 5));
        assert!(pagination(Some(0), None).is_err());
        assert!(pagination(None, Some(0)).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("name", "Tea").is_ok());
        assert!(require_text("name", "  ").is_err());
    }

    #[test]
    fn amounts_must_fit_money_columns() {
        assert!(require_amount("price", Money::zero()).is_ok());
        assert!(require_amount("price", Money::max_storable()).is_ok());
        assert!(require_amount("price", Money::from_cents(-1)).is_err());

        let above = Money::max_storable()
            .checked_add(Money::from_cents(1))
            .unwrap();
        assert!(require_amount("price", above).is_err());
    }
}
