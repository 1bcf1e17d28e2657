//! Application services for the point-of-sale system.
//!
//! Each service orchestrates one or more repositories and the cache for a
//! group of use cases:
//! - [`OrderService`] prices, records and aggregates orders
//! - [`CategoryService`], [`ProductService`], [`PaymentService`] and
//!   [`UserService`] manage the catalogue and accounts
//! - [`AuthService`] exchanges credentials for an access token
//!
//! Services return [`DomainError`]; storage details never leak past them.

pub mod auth;
pub mod cached;
pub mod category;
pub mod error;
pub mod order;
pub mod password;
mod patch;
pub mod payment;
pub mod product;
pub mod token;
pub mod user;

pub use auth::AuthService;
pub use cached::CacheAside;
pub use category::CategoryService;
pub use error::{DomainError, Result};
pub use order::OrderService;
pub use payment::PaymentService;
pub use product::ProductService;
pub use token::{TokenError, TokenPayload, TokenService};
pub use user::UserService;
