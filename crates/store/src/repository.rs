use async_trait::async_trait;
use common::{
    Category, CategoryId, NewCategory, NewPayment, NewProduct, NewUser, Order, OrderDraft,
    OrderId, Pagination, Payment, PaymentId, Product, ProductFilter, ProductId, User, UserId,
};

use crate::Result;

/// Durable storage for categories.
///
/// Lookups of a missing record fail with `StoreError::NotFound`; writes that
/// would duplicate a unique name fail with `StoreError::Conflict`.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> Result<Category>;

    async fn get_category_by_id(&self, id: CategoryId) -> Result<Category>;

    /// Lists categories ordered by id.
    async fn list_categories(&self, page: Pagination) -> Result<Vec<Category>>;

    /// Overwrites the stored category with `category`, refreshing `updated_at`.
    async fn update_category(&self, category: &Category) -> Result<Category>;

    async fn delete_category(&self, id: CategoryId) -> Result<()>;
}

/// Durable storage for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Creates a product with a freshly generated SKU.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    async fn get_product_by_id(&self, id: ProductId) -> Result<Product>;

    /// Lists products matching `filter`, ordered by id.
    async fn list_products(&self, filter: &ProductFilter, page: Pagination)
    -> Result<Vec<Product>>;

    async fn update_product(&self, product: &Product) -> Result<Product>;

    async fn delete_product(&self, id: ProductId) -> Result<()>;
}

/// Durable storage for payment methods.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment>;

    async fn get_payment_by_id(&self, id: PaymentId) -> Result<Payment>;

    async fn list_payments(&self, page: Pagination) -> Result<Vec<Payment>>;

    async fn update_payment(&self, payment: &Payment) -> Result<Payment>;

    async fn delete_payment(&self, id: PaymentId) -> Result<()>;
}

/// Durable storage for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user. `user.password` must already be hashed.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user_by_id(&self, id: UserId) -> Result<User>;

    async fn get_user_by_email(&self, email: &str) -> Result<User>;

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>>;

    async fn update_user(&self, user: &User) -> Result<User>;

    async fn delete_user(&self, id: UserId) -> Result<()>;
}

/// Read access to stored orders.
///
/// Orders are written only through an [`OrderTransaction`]. Returned orders
/// carry their lines but no attached user, payment or product.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_order_by_id(&self, id: OrderId) -> Result<Order>;

    async fn list_orders(&self, page: Pagination) -> Result<Vec<Order>>;
}

/// Starts transactions spanning product stock and order rows.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Transaction: OrderTransaction;

    async fn begin(&self) -> Result<Self::Transaction>;
}

/// An open transaction for creating an order.
///
/// Products read through the transaction stay locked until it ends. Nothing
/// written through it is visible to others before [`commit`](Self::commit);
/// dropping the transaction without committing rolls it back.
#[async_trait]
pub trait OrderTransaction: Send {
    async fn get_product(&mut self, id: ProductId) -> Result<Product>;

    async fn set_stock(&mut self, id: ProductId, stock: u32) -> Result<()>;

    /// Inserts the order and its lines, assigning ids and timestamps.
    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order>;

    async fn commit(self) -> Result<()>;
}
