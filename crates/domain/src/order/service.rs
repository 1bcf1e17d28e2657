//! Order service.

use std::collections::{BTreeMap, BTreeSet};

use common::{Money, NewOrder, Order, OrderDraft, OrderId, Pagination, ProductId};
use store::{
    Cache, CategoryRepository, OrderRepository, OrderTransaction, PaymentRepository,
    ProductRepository, StoreError, UnitOfWork, UserRepository, keys,
};
use uuid::Uuid;

use super::pricing;
use crate::cached::CacheAside;
use crate::error::{DomainError, Result};

const ENTITY: &str = "order";
const COLLECTION: &str = "orders";
const PRODUCT_ENTITY: &str = "product";
const PRODUCT_COLLECTION: &str = "products";

/// Collapses a failure while writing an already validated order.
fn write_failed(err: StoreError) -> DomainError {
    tracing::error!(error = %err, "order write failed");
    DomainError::Internal
}

/// Service for creating and reading orders.
///
/// Orders are returned enriched: the owning user, the payment method and,
/// on every line, the product with its category.
pub struct OrderService<S, C> {
    store: S,
    cache: CacheAside<C>,
}

impl<S, C> OrderService<S, C>
where
    S: OrderRepository
        + UnitOfWork
        + ProductRepository
        + CategoryRepository
        + UserRepository
        + PaymentRepository,
    C: Cache,
{
    /// Creates a new order service.
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store,
            cache: CacheAside::new(cache),
        }
    }

    /// Prices and records a sale.
    ///
    /// Stock checks, stock decrements and the insert run in one transaction;
    /// a rejected order leaves no trace. Cache invalidation, enrichment and
    /// caching happen after commit, so a failure there is returned while the
    /// order stays stored. Cached order pages and sold products are dropped
    /// before enrichment.
    #[tracing::instrument(
        skip(self, order),
        fields(user_id = %order.user_id, lines = order.products.len())
    )]
    pub async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let order = match self.record(order).await {
            Ok(order) => order,
            Err(err) => {
                metrics::counter!("orders_rejected_total", "reason" => pricing::rejection_reason(&err))
                    .increment(1);
                return Err(err);
            }
        };
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, total_price = %order.total_price, "order created");

        self.cache.invalidate(COLLECTION).await?;
        self.evict_sold_products(&order).await?;

        let order = self.enrich(order).await?;
        self.cache
            .write(&keys::entity(ENTITY, order.id), &order)
            .await?;

        Ok(order)
    }

    /// Drops cached products whose stock the order changed.
    async fn evict_sold_products(&self, order: &Order) -> Result<()> {
        let sold: BTreeSet<ProductId> = order.products.iter().map(|l| l.product_id).collect();
        for product_id in sold {
            self.cache
                .remove(&keys::entity(PRODUCT_ENTITY, product_id))
                .await?;
        }
        self.cache.invalidate(PRODUCT_COLLECTION).await
    }

    /// Validates, prices and stores `order` inside one transaction.
    async fn record(&self, order: NewOrder) -> Result<Order> {
        let mut tx = self.store.begin().await?;

        // Rows are locked in id order so concurrent orders cannot deadlock.
        let ids: BTreeSet<ProductId> = order.products.iter().map(|l| l.product_id).collect();
        let mut locked = BTreeMap::new();
        for product_id in ids {
            locked.insert(product_id, tx.get_product(product_id).await?);
        }

        // Each locked product's stock tracks the units left after the lines
        // seen so far.
        let mut lines = Vec::with_capacity(order.products.len());
        let mut total_price = Money::zero();

        for requested in &order.products {
            let product = locked
                .get_mut(&requested.product_id)
                .ok_or(DomainError::NotFound)?;
            let available = product.stock;

            let line = pricing::price_line(product, requested.quantity, available)?;
            product.stock = available - requested.quantity;
            total_price = pricing::add_line(total_price, &line)?;
            lines.push(line);
        }

        let total_return = pricing::change_due(total_price, order.total_paid)?;

        for (&product_id, product) in &locked {
            tx.set_stock(product_id, product.stock)
                .await
                .map_err(write_failed)?;
        }

        let draft = OrderDraft {
            user_id: order.user_id,
            payment_id: order.payment_id,
            customer_name: order.customer_name,
            total_price,
            total_paid: order.total_paid,
            total_return,
            receipt_code: Uuid::new_v4(),
            lines,
        };
        let order = tx.insert_order(draft).await.map_err(write_failed)?;
        tx.commit().await.map_err(write_failed)?;

        Ok(order)
    }

    /// Gets an order, reading through the cache.
    ///
    /// A cached order is returned as is.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        let key = keys::entity(ENTITY, id);
        if let Some(order) = self.cache.read(&key).await? {
            return Ok(order);
        }

        let order = self.store.get_order_by_id(id).await?;
        let order = self.enrich(order).await?;

        self.cache.write(&key, &order).await?;
        Ok(order)
    }

    /// Lists a page of orders in id order, reading through the cache.
    ///
    /// The page is cached under `orders:<skip>-<limit>` until the next order
    /// is created.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, page: Pagination) -> Result<Vec<Order>> {
        let key = keys::list(COLLECTION, &page.cache_params());
        if let Some(orders) = self.cache.read(&key).await? {
            return Ok(orders);
        }

        let stored = self.store.list_orders(page).await?;
        let mut orders = Vec::with_capacity(stored.len());
        for order in stored {
            orders.push(self.enrich(order).await?);
        }

        self.cache.write(&key, &orders).await?;
        Ok(orders)
    }

    /// Attaches the user, the payment method and each line's product and
    /// category.
    async fn enrich(&self, mut order: Order) -> Result<Order> {
        order.user = Some(self.store.get_user_by_id(order.user_id).await?);
        order.payment = Some(self.store.get_payment_by_id(order.payment_id).await?);

        for line in &mut order.products {
            let mut product = self.store.get_product_by_id(line.product_id).await?;
            product.category = Some(self.store.get_category_by_id(product.category_id).await?);
            line.product = Some(product);
        }

        Ok(order)
    }
}
