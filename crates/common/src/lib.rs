//! Shared types for the point-of-sale system.
//!
//! Identifiers, pagination, money and the entity model used by the store
//! adapters, the application services and the HTTP layer.

pub mod model;
pub mod money;
pub mod types;

pub use model::{
    Category, CategoryUpdate, NewCategory, NewOrder, NewOrderProduct, NewPayment, NewProduct,
    NewUser, Order, OrderDraft, OrderLine, OrderProduct, ParseEnumError, Payment, PaymentType,
    PaymentUpdate, Product, ProductFilter, ProductUpdate, User, UserRole, UserUpdate,
};
pub use money::Money;
pub use types::{CategoryId, OrderId, OrderProductId, Pagination, PaymentId, ProductId, UserId};
