//! Shared application state.

use domain::{
    AuthService, CategoryService, OrderService, PaymentService, ProductService, UserService,
};
use store::{
    Cache, CategoryRepository, OrderRepository, PaymentRepository, ProductRepository,
    UnitOfWork, UserRepository,
};

use crate::auth::HmacTokenService;

/// Everything the handlers need from a store.
pub trait PosStore:
    CategoryRepository
    + ProductRepository
    + PaymentRepository
    + UserRepository
    + OrderRepository
    + UnitOfWork
    + Clone
    + 'static
{
}

impl<T> PosStore for T where
    T: CategoryRepository
        + ProductRepository
        + PaymentRepository
        + UserRepository
        + OrderRepository
        + UnitOfWork
        + Clone
        + 'static
{
}

/// Everything the handlers need from a cache.
pub trait PosCache: Cache + Clone + 'static {}

impl<T> PosCache for T where T: Cache + Clone + 'static {}

/// Shared application state accessible from all handlers.
pub struct AppState<S, C> {
    pub orders: OrderService<S, C>,
    pub products: ProductService<S, C>,
    pub categories: CategoryService<S, C>,
    pub payments: PaymentService<S, C>,
    pub users: UserService<S, C>,
    pub auth: AuthService<S, HmacTokenService>,
}

impl<S: PosStore, C: PosCache> AppState<S, C> {
    /// Wires every service to the same store and cache.
    pub fn new(store: S, cache: C, tokens: HmacTokenService) -> Self {
        Self {
            orders: OrderService::new(store.clone(), cache.clone()),
            products: ProductService::new(store.clone(), cache.clone()),
            categories: CategoryService::new(store.clone(), cache.clone()),
            payments: PaymentService::new(store.clone(), cache.clone()),
            users: UserService::new(store.clone(), cache),
            auth: AuthService::new(store, tokens),
        }
    }
}
