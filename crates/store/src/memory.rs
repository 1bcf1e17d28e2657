use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    Category, CategoryId, NewCategory, NewPayment, NewProduct, NewUser, Order, OrderDraft,
    OrderId, OrderProduct, OrderProductId, Pagination, Payment, PaymentId, Product, ProductFilter,
    ProductId, User, UserId,
};
use tokio::sync::{Mutex, OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    repository::{
        CategoryRepository, OrderRepository, OrderTransaction, PaymentRepository,
        ProductRepository, UnitOfWork, UserRepository,
    },
};

/// Next value of each id sequence.
#[derive(Debug, Clone, Default)]
struct Sequences {
    category: u64,
    product: u64,
    payment: u64,
    user: u64,
    order: u64,
    order_product: u64,
}

fn next(seq: &mut u64) -> u64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    payments: BTreeMap<PaymentId, Payment>,
    users: BTreeMap<UserId, User>,
    orders: BTreeMap<OrderId, Order>,
    sequences: Sequences,
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, page: Pagination) -> Vec<T> {
    rows.skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect()
}

/// In-memory store implementing every repository port, for tests and local
/// runs without a database.
///
/// Enforces the same uniqueness rules as the PostgreSQL schema. A
/// transaction holds the store's write lock until it is committed or
/// dropped, so order creation is fully serialized.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    reads: Arc<AtomicUsize>,
    fail_on_read: Arc<AtomicBool>,
    locked_products: Arc<Mutex<Vec<ProductId>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many read operations have been served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Configures every subsequent read to fail with `StoreError::Unavailable`.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    /// Returns every product read inside a transaction, in lock order.
    pub async fn locked_products(&self) -> Vec<ProductId> {
        self.locked_products.lock().await.clone()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Clears all records and resets the id sequences.
    pub async fn clear(&self) {
        *self.state.write().await = StoreState::default();
        self.locked_products.lock().await.clear();
    }

    fn record_read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads are disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.name == category.name) {
            return Err(StoreError::Conflict("category name".to_string()));
        }

        let now = Utc::now();
        let id = CategoryId::new(next(&mut state.sequences.category));
        let category = Category {
            id,
            name: category.name,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category_by_id(&self, id: CategoryId) -> Result<Category> {
        self.record_read()?;
        self.state
            .read()
            .await
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_categories(&self, page: Pagination) -> Result<Vec<Category>> {
        self.record_read()?;
        let state = self.state.read().await;
        Ok(page_of(state.categories.values().cloned(), page))
    }

    async fn update_category(&self, category: &Category) -> Result<Category> {
        let mut state = self.state.write().await;
        if state
            .categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(StoreError::Conflict("category name".to_string()));
        }

        let stored = state
            .categories
            .get_mut(&category.id)
            .ok_or(StoreError::NotFound)?;
        stored.name = category.name.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.state
            .write()
            .await
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        if state.products.values().any(|p| p.name == product.name) {
            return Err(StoreError::Conflict("product name".to_string()));
        }

        let now = Utc::now();
        let id = ProductId::new(next(&mut state.sequences.product));
        let product = Product {
            id,
            category_id: product.category_id,
            sku: Uuid::new_v4(),
            name: product.name,
            image: product.image,
            stock: product.stock,
            price: product.price,
            created_at: now,
            updated_at: now,
            category: None,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_product_by_id(&self, id: ProductId) -> Result<Product> {
        self.record_read()?;
        self.state
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Vec<Product>> {
        self.record_read()?;
        let state = self.state.read().await;
        let matching = state.products.values().filter(|p| filter.matches(p)).cloned();
        Ok(page_of(matching, page))
    }

    async fn update_product(&self, product: &Product) -> Result<Product> {
        let mut state = self.state.write().await;
        if state
            .products
            .values()
            .any(|p| p.id != product.id && p.name == product.name)
        {
            return Err(StoreError::Conflict("product name".to_string()));
        }

        let stored = state
            .products
            .get_mut(&product.id)
            .ok_or(StoreError::NotFound)?;
        stored.category_id = product.category_id;
        stored.name = product.name.clone();
        stored.image = product.image.clone();
        stored.stock = product.stock;
        stored.price = product.price;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.state
            .write()
            .await
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        let mut state = self.state.write().await;
        if state.payments.values().any(|p| p.name == payment.name) {
            return Err(StoreError::Conflict("payment name".to_string()));
        }

        let now = Utc::now();
        let id = PaymentId::new(next(&mut state.sequences.payment));
        let payment = Payment {
            id,
            name: payment.name,
            payment_type: payment.payment_type,
            logo: payment.logo,
            created_at: now,
            updated_at: now,
        };
        state.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn get_payment_by_id(&self, id: PaymentId) -> Result<Payment> {
        self.record_read()?;
        self.state
            .read()
            .await
            .payments
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_payments(&self, page: Pagination) -> Result<Vec<Payment>> {
        self.record_read()?;
        let state = self.state.read().await;
        Ok(page_of(state.payments.values().cloned(), page))
    }

    async fn update_payment(&self, payment: &Payment) -> Result<Payment> {
        let mut state = self.state.write().await;
        if state
            .payments
            .values()
            .any(|p| p.id != payment.id && p.name == payment.name)
        {
            return Err(StoreError::Conflict("payment name".to_string()));
        }

        let stored = state
            .payments
            .get_mut(&payment.id)
            .ok_or(StoreError::NotFound)?;
        stored.name = payment.name.clone();
        stored.payment_type = payment.payment_type;
        stored.logo = payment.logo.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_payment(&self, id: PaymentId) -> Result<()> {
        self.state
            .write()
            .await
            .payments
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("user email".to_string()));
        }

        let now = Utc::now();
        let id = UserId::new(next(&mut state.sequences.user));
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User> {
        self.record_read()?;
        self.state
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.record_read()?;
        self.state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>> {
        self.record_read()?;
        let state = self.state.read().await;
        Ok(page_of(state.users.values().cloned(), page))
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict("user email".to_string()));
        }

        let stored = state.users.get_mut(&user.id).ok_or(StoreError::NotFound)?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password = user.password.clone();
        stored.role = user.role;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.state
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn get_order_by_id(&self, id: OrderId) -> Result<Order> {
        self.record_read()?;
        self.state
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_orders(&self, page: Pagination) -> Result<Vec<Order>> {
        self.record_read()?;
        let state = self.state.read().await;
        Ok(page_of(state.orders.values().cloned(), page))
    }
}

/// Transaction over an [`InMemoryStore`].
///
/// Works on a copy of the state while holding the write lock; commit swaps
/// the copy in.
pub struct InMemoryTransaction {
    guard: OwnedRwLockWriteGuard<StoreState>,
    staged: StoreState,
    store: InMemoryStore,
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction> {
        let guard = self.state.clone().write_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTransaction {
            guard,
            staged,
            store: self.clone(),
        })
    }
}

#[async_trait]
impl OrderTransaction for InMemoryTransaction {
    async fn get_product(&mut self, id: ProductId) -> Result<Product> {
        self.store.record_read()?;
        self.store.locked_products.lock().await.push(id);
        self.staged
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn set_stock(&mut self, id: ProductId, stock: u32) -> Result<()> {
        let product = self
            .staged
            .products
            .get_mut(&id)
            .ok_or(StoreError::NotFound)?;
        product.stock = stock;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order> {
        if self
            .staged
            .orders
            .values()
            .any(|o| o.receipt_code == draft.receipt_code)
        {
            return Err(StoreError::Conflict("order receipt code".to_string()));
        }

        let now = Utc::now();
        let sequences = &mut self.staged.sequences;
        let order_id = OrderId::new(next(&mut sequences.order));
        let products = draft
            .lines
            .iter()
            .map(|line| OrderProduct {
                id: OrderProductId::new(next(&mut sequences.order_product)),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                total_price: line.total_price,
                created_at: now,
                updated_at: now,
                product: None,
            })
            .collect();

        let order = Order {
            id: order_id,
            user_id: draft.user_id,
            payment_id: draft.payment_id,
            customer_name: draft.customer_name,
            total_price: draft.total_price,
            total_paid: draft.total_paid,
            total_return: draft.total_return,
            receipt_code: draft.receipt_code,
            products,
            created_at: now,
            updated_at: now,
            user: None,
            payment: None,
        };
        self.staged.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, OrderLine, PaymentType, UserRole};

    async fn seed_product(store: &InMemoryStore, name: &str, stock: u32) -> Product {
        store
            .create_product(NewProduct {
                category_id: CategoryId::new(1),
                name: name.to_string(),
                image: String::new(),
                stock,
                price: Money::from_cents(1000),
            })
            .await
            .unwrap()
    }

    fn draft(product_id: ProductId, quantity: u32) -> OrderDraft {
        let total = Money::from_cents(1000).checked_multiply(quantity).unwrap();
        OrderDraft {
            user_id: UserId::new(1),
            payment_id: PaymentId::new(1),
            customer_name: "Walk-in".to_string(),
            total_price: total,
            total_paid: total,
            total_return: Money::zero(),
            receipt_code: Uuid::new_v4(),
            lines: vec![OrderLine {
                product_id,
                quantity,
                total_price: total,
            }],
        }
    }

    #[tokio::test]
    async fn category_crud() {
        let store = InMemoryStore::new();

        let created = store
            .create_category(NewCategory::new("Drinks"))
            .await
            .unwrap();
        assert_eq!(created.id, CategoryId::new(1));

        let mut fetched = store.get_category_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);

        fetched.name = "Beverages".to_string();
        let updated = store.update_category(&fetched).await.unwrap();
        assert_eq!(updated.name, "Beverages");

        store.delete_category(created.id).await.unwrap();
        assert!(matches!(
            store.get_category_by_id(created.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_category_name_conflicts() {
        let store = InMemoryStore::new();
        store.create_category(NewCategory::new("Drinks")).await.unwrap();
        let food = store.create_category(NewCategory::new("Food")).await.unwrap();

        assert!(matches!(
            store.create_category(NewCategory::new("Drinks")).await,
            Err(StoreError::Conflict(_))
        ));

        let renamed = Category {
            name: "Drinks".to_string(),
            ..food
        };
        assert!(matches!(
            store.update_category(&renamed).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn delete_missing_record_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.delete_payment(PaymentId::new(9)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_is_page_based() {
        let store = InMemoryStore::new();
        for name in ["A", "B", "C", "D", "E"] {
            store.create_category(NewCategory::new(name)).await.unwrap();
        }

        let page: Vec<_> = store
            .list_categories(Pagination::new(2, 2))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(page, vec!["C", "D"]);

        let last = store.list_categories(Pagination::new(3, 2)).await.unwrap();
        assert_eq!(last.len(), 1);
    }

    #[tokio::test]
    async fn list_products_applies_filter() {
        let store = InMemoryStore::new();
        seed_product(&store, "Iced Coffee", 1).await;
        seed_product(&store, "Hot Coffee", 1).await;
        seed_product(&store, "Tea", 1).await;

        let filter = ProductFilter {
            search: Some("coffee".to_string()),
            category_id: None,
        };
        let found = store
            .list_products(&filter, Pagination::new(1, 10))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn user_lookup_by_email() {
        let store = InMemoryStore::new();
        let user = store
            .create_user(NewUser {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password: "hash".to_string(),
                role: UserRole::Admin,
            })
            .await
            .unwrap();

        let found = store.get_user_by_email("ana@example.com").await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(matches!(
            store.get_user_by_email("bob@example.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn payment_update_refreshes_fields() {
        let store = InMemoryStore::new();
        let payment = store
            .create_payment(NewPayment {
                name: "Cash".to_string(),
                payment_type: PaymentType::Cash,
                logo: String::new(),
            })
            .await
            .unwrap();

        let changed = Payment {
            logo: "https://cdn.example.com/cash.png".to_string(),
            ..payment.clone()
        };
        let updated = store.update_payment(&changed).await.unwrap();
        assert_eq!(updated.logo, changed.logo);
        assert!(updated.updated_at >= payment.updated_at);
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, "Tea", 5).await;

        let mut tx = store.begin().await.unwrap();
        tx.set_stock(product.id, 2).await.unwrap();
        let order = tx.insert_order(draft(product.id, 3)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.products[0].id, OrderProductId::new(1));
        assert_eq!(store.order_count().await, 1);
        assert_eq!(store.get_product_by_id(product.id).await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, "Tea", 5).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_stock(product.id, 0).await.unwrap();
            tx.insert_order(draft(product.id, 5)).await.unwrap();
        }

        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.get_product_by_id(product.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn transaction_reads_its_own_writes() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, "Tea", 5).await;

        let mut tx = store.begin().await.unwrap();
        tx.set_stock(product.id, 1).await.unwrap();
        assert_eq!(tx.get_product(product.id).await.unwrap().stock, 1);
        drop(tx);

        assert_eq!(store.locked_products().await, vec![product.id]);
    }

    #[tokio::test]
    async fn failing_reads_report_unavailable() {
        let store = InMemoryStore::new();
        store.set_fail_on_read(true);

        assert!(matches!(
            store.list_orders(Pagination::default()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.read_count(), 1);
    }
}
