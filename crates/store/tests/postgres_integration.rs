//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container and truncate every table
//! before each test, so they run serially. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use common::{
    CategoryId, Money, NewCategory, NewOrderProduct, NewPayment, NewProduct, NewUser, OrderDraft,
    OrderLine, Pagination, PaymentId, PaymentType, ProductFilter, UserId, UserRole,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    CategoryRepository, OrderRepository, OrderTransaction, PaymentRepository, PostgresStore,
    ProductRepository, StoreError, UnitOfWork, UserRepository,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_pos_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and empty tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE order_products, orders, products, categories, payments, users \
         RESTART IDENTITY",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresStore::new(pool)
}

fn new_product(name: &str, stock: u32, cents: i64) -> NewProduct {
    NewProduct {
        category_id: CategoryId::new(1),
        name: name.to_string(),
        image: String::new(),
        stock,
        price: Money::from_cents(cents),
    }
}

fn draft(line: NewOrderProduct, unit: Money) -> OrderDraft {
    let total = unit.checked_multiply(line.quantity).unwrap();
    OrderDraft {
        user_id: UserId::new(1),
        payment_id: PaymentId::new(1),
        customer_name: "Walk-in".to_string(),
        total_price: total,
        total_paid: total,
        total_return: Money::zero(),
        receipt_code: Uuid::new_v4(),
        lines: vec![OrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
            total_price: total,
        }],
    }
}

#[tokio::test]
#[serial]
async fn category_crud_round_trip() {
    let store = get_test_store().await;

    let created = store
        .create_category(NewCategory::new("Drinks"))
        .await
        .unwrap();
    assert_eq!(created.id, CategoryId::new(1));

    let mut fetched = store.get_category_by_id(created.id).await.unwrap();
    assert_eq!(fetched.name, "Drinks");

    fetched.name = "Beverages".to_string();
    let updated = store.update_category(&fetched).await.unwrap();
    assert_eq!(updated.name, "Beverages");
    assert!(updated.updated_at >= created.updated_at);

    store.delete_category(created.id).await.unwrap();
    assert!(matches!(
        store.get_category_by_id(created.id).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.delete_category(created.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
#[serial]
async fn duplicate_names_conflict() {
    let store = get_test_store().await;

    store.create_category(NewCategory::new("Food")).await.unwrap();
    let result = store.create_category(NewCategory::new("Food")).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    store
        .create_user(NewUser {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "hash".to_string(),
            role: UserRole::Admin,
        })
        .await
        .unwrap();
    let result = store
        .create_user(NewUser {
            name: "Other".to_string(),
            email: "ana@example.com".to_string(),
            password: "hash".to_string(),
            role: UserRole::Cashier,
        })
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
#[serial]
async fn payment_type_and_user_role_survive_storage() {
    let store = get_test_store().await;

    let payment = store
        .create_payment(NewPayment {
            name: "GoPay".to_string(),
            payment_type: PaymentType::EWallet,
            logo: "gopay.png".to_string(),
        })
        .await
        .unwrap();
    let fetched = store.get_payment_by_id(payment.id).await.unwrap();
    assert_eq!(fetched.payment_type, PaymentType::EWallet);

    let user = store
        .create_user(NewUser {
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
            password: "hash".to_string(),
            role: UserRole::Cashier,
        })
        .await
        .unwrap();
    let by_email = store.get_user_by_email("budi@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.role, UserRole::Cashier);
}

#[tokio::test]
#[serial]
async fn list_products_filters_and_pages() {
    let store = get_test_store().await;

    store.create_product(new_product("Iced Tea", 5, 1000)).await.unwrap();
    store.create_product(new_product("Hot Tea", 5, 800)).await.unwrap();
    store.create_product(new_product("Coffee", 5, 1200)).await.unwrap();
    store
        .create_product(NewProduct {
            category_id: CategoryId::new(2),
            ..new_product("Tea Cake", 5, 1500)
        })
        .await
        .unwrap();

    let filter = ProductFilter {
        search: Some("TEA".to_string()),
        category_id: Some(CategoryId::new(1)),
    };
    let found = store
        .list_products(&filter, Pagination::default())
        .await
        .unwrap();
    let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Iced Tea", "Hot Tea"]);

    let second_page = store
        .list_products(&ProductFilter::default(), Pagination::new(2, 3))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].name, "Tea Cake");
}

#[tokio::test]
#[serial]
async fn committed_transaction_writes_stock_and_order() {
    let store = get_test_store().await;
    let product = store.create_product(new_product("Tea", 5, 1000)).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let locked = tx.get_product(product.id).await.unwrap();
    tx.set_stock(product.id, locked.stock - 3).await.unwrap();
    let order = tx
        .insert_order(draft(NewOrderProduct::new(product.id, 3), product.price))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(order.products.len(), 1);
    assert_eq!(order.total_price, Money::from_cents(3000));

    let stored = store.get_order_by_id(order.id).await.unwrap();
    assert_eq!(stored.products, order.products);
    assert_eq!(stored.receipt_code, order.receipt_code);
    assert_eq!(store.get_product_by_id(product.id).await.unwrap().stock, 2);
}

#[tokio::test]
#[serial]
async fn dropped_transaction_rolls_back() {
    let store = get_test_store().await;
    let product = store.create_product(new_product("Tea", 5, 1000)).await.unwrap();

    {
        let mut tx = store.begin().await.unwrap();
        tx.set_stock(product.id, 0).await.unwrap();
        tx.insert_order(draft(NewOrderProduct::new(product.id, 5), product.price))
            .await
            .unwrap();
    }

    assert_eq!(store.get_product_by_id(product.id).await.unwrap().stock, 5);
    assert!(
        store
            .list_orders(Pagination::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[serial]
async fn list_orders_attaches_lines_to_each_order() {
    let store = get_test_store().await;
    let tea = store.create_product(new_product("Tea", 10, 1000)).await.unwrap();
    let coffee = store.create_product(new_product("Coffee", 10, 1200)).await.unwrap();

    for (product, qty) in [(&tea, 1), (&coffee, 2), (&tea, 3)] {
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(draft(NewOrderProduct::new(product.id, qty), product.price))
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    let orders = store.list_orders(Pagination::default()).await.unwrap();
    let quantities: Vec<_> = orders.iter().map(|o| o.products[0].quantity).collect();
    assert_eq!(quantities, vec![1, 2, 3]);
    assert!(orders.iter().all(|o| o.products.len() == 1));
    assert!(orders.iter().all(|o| o.products[0].order_id == o.id));
}
