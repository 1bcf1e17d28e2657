//! Stock and payment rules applied while pricing an order.

use common::{Money, OrderLine, Product};

use crate::error::{DomainError, Result};

/// Prices `quantity` units of `product`, given that `available` units are
/// still unclaimed by earlier lines of the same order.
pub(super) fn price_line(product: &Product, quantity: u32, available: u32) -> Result<OrderLine> {
    if quantity > available {
        return Err(DomainError::InsufficientStock {
            product_id: product.id,
            requested: quantity,
            available,
        });
    }

    let total_price = product
        .price
        .checked_multiply(quantity)
        .filter(Money::is_storable)
        .ok_or(DomainError::AmountOutOfRange)?;

    Ok(OrderLine {
        product_id: product.id,
        quantity,
        total_price,
    })
}

/// Adds `line` to the running order total.
pub(super) fn add_line(total: Money, line: &OrderLine) -> Result<Money> {
    total
        .checked_add(line.total_price)
        .filter(Money::is_storable)
        .ok_or(DomainError::AmountOutOfRange)
}

/// Returns the change owed to the customer.
pub(super) fn change_due(total_price: Money, total_paid: Money) -> Result<Money> {
    if total_paid < total_price {
        return Err(DomainError::InsufficientPayment {
            total_price,
            total_paid,
        });
    }
    Ok(total_paid - total_price)
}

/// Label for the `orders_rejected_total` counter.
pub(super) fn rejection_reason(err: &DomainError) -> &'static str {
    match err {
        DomainError::InsufficientStock { .. } => "insufficient_stock",
        DomainError::InsufficientPayment { .. } => "insufficient_payment",
        DomainError::AmountOutOfRange => "amount_out_of_range",
        DomainError::NotFound => "not_found",
        _ => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CategoryId, ProductId};
    use uuid::Uuid;

    fn product(stock: u32, cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            category_id: CategoryId::new(1),
            sku: Uuid::new_v4(),
            name: "Tea".to_string(),
            image: String::new(),
            stock,
            price: Money::from_cents(cents),
            created_at: now,
            updated_at: now,
            category: None,
        }
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        let line = price_line(&product(5, 1000), 3, 5).unwrap();
        assert_eq!(line.total_price, Money::from_cents(3000));
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn quantity_above_available_is_rejected() {
        let err = price_line(&product(5, 1000), 6, 5).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                product_id: ProductId::new(1),
                requested: 6,
                available: 5,
            }
        );
        assert_eq!(rejection_reason(&err), "insufficient_stock");
    }

    #[test]
    fn whole_stock_can_be_sold() {
        assert!(price_line(&product(5, 1000), 5, 5).is_ok());
    }

    #[test]
    fn line_total_above_storable_range_is_rejected() {
        let mut pricey = product(5, 0);
        pricey.price = Money::max_storable();

        assert!(price_line(&pricey, 1, 5).is_ok());
        let err = price_line(&pricey, 2, 5).unwrap_err();
        assert_eq!(err, DomainError::AmountOutOfRange);
        assert_eq!(rejection_reason(&err), "amount_out_of_range");
    }

    #[test]
    fn running_total_above_storable_range_is_rejected() {
        let mut pricey = product(5, 0);
        pricey.price = Money::max_storable();
        let line = price_line(&pricey, 1, 5).unwrap();

        assert_eq!(add_line(Money::zero(), &line), Ok(Money::max_storable()));
        assert_eq!(
            add_line(Money::from_cents(1), &line),
            Err(DomainError::AmountOutOfRange)
        );
    }

    #[test]
    fn change_due_rules() {
        assert_eq!(
            change_due(Money::from_cents(3000), Money::from_cents(4000)),
            Ok(Money::from_cents(1000))
        );
        assert_eq!(
            change_due(Money::from_cents(3000), Money::from_cents(3000)),
            Ok(Money::zero())
        );
        assert!(matches!(
            change_due(Money::from_cents(3000), Money::from_cents(2999)),
            Err(DomainError::InsufficientPayment { .. })
        ));
    }
}
