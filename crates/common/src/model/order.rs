use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Money, OrderId, OrderProductId, Payment, PaymentId, Product, ProductId, User, UserId,
};

/// A completed sale.
///
/// `user`, `payment` and each line's `product` are attached by the order
/// service after the core record is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub customer_name: String,
    pub total_price: Money,
    pub total_paid: Money,
    pub total_return: Money,
    pub receipt_code: Uuid,
    pub products: Vec<OrderProduct>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

impl Order {
    /// Returns the number of lines in the order.
    pub fn line_count(&self) -> usize {
        self.products.len()
    }
}

/// One line of an order with its price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub id: OrderProductId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time of the order times `quantity`.
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

/// An order as submitted at the till, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub customer_name: String,
    pub total_paid: Money,
    pub products: Vec<NewOrderProduct>,
}

/// A requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderProduct {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl NewOrderProduct {
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A priced order ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub customer_name: String,
    pub total_price: Money,
    pub total_paid: Money,
    pub total_return: Money,
    pub receipt_code: Uuid,
    pub lines: Vec<OrderLine>,
}

/// A priced line of an [`OrderDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: Money,
}
