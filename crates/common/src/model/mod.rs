//! Entity model.

mod category;
mod order;
mod payment;
mod product;
mod user;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use order::{NewOrder, NewOrderProduct, Order, OrderDraft, OrderLine, OrderProduct};
pub use payment::{NewPayment, Payment, PaymentType, PaymentUpdate};
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate};
pub use user::{NewUser, User, UserRole, UserUpdate};

/// Error returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}
