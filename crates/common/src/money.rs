//! Exact decimal money amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money amount backed by an exact decimal to avoid floating point issues.
///
/// Serialized as a decimal string (`"30.00"`) so scale survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates an amount from cents (e.g., 1000 = 10.00).
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Largest amount a `NUMERIC(18,2)` column holds: `9999999999999999.99`.
    pub fn max_storable() -> Money {
        Money(Decimal::new(999_999_999_999_999_999, 2))
    }

    /// Returns true if the amount fits the stored money columns.
    pub fn is_storable(&self) -> bool {
        self.0.abs() <= Self::max_storable().0
    }

    /// Multiplies by a quantity, or `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_keeps_two_decimal_places() {
        let money = Money::from_cents(1234);
        assert_eq!(money.to_string(), "12.34");
    }

    #[test]
    fn equality_ignores_scale() {
        assert_eq!(Money::from_cents(3000), Money::new(Decimal::from(30)));
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1250)));
        assert_eq!(a - b, Money::from_cents(750));
        assert_eq!(a.checked_multiply(3), Some(Money::from_cents(3000)));
        assert!((b - a).is_negative());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn overflow_is_reported_not_panicked() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_multiply(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(1)), None);
        assert_eq!(huge.checked_multiply(1), Some(huge));
    }

    #[test]
    fn storable_range_matches_numeric_18_2() {
        let max = Money::max_storable();
        assert_eq!(max.to_string(), "9999999999999999.99");
        assert!(max.is_storable());
        assert!(Money::from_cents(-1000).is_storable());

        let above = max.checked_add(Money::from_cents(1)).unwrap();
        assert!(!above.is_storable());
        assert!(!Money::new(Decimal::MAX).is_storable());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(3000)).unwrap();
        assert_eq!(json, "\"30.00\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(3000));
    }
}
