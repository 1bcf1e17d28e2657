//! Storage ports and adapters for the point-of-sale system.
//!
//! The ports are the per-entity repository traits, the [`UnitOfWork`] used to
//! create orders atomically, and the key-value [`Cache`]. Each port has an
//! in-memory adapter; the repositories also have a PostgreSQL adapter.

pub mod cache;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use cache::{Cache, CacheCodec, InMemoryCache, JsonCodec, keys};
pub use error::{CacheError, CacheResult, Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{
    CategoryRepository, OrderRepository, OrderTransaction, PaymentRepository,
    ProductRepository, UnitOfWork, UserRepository,
};
