use std::collections::HashMap;

use async_trait::async_trait;
use common::{
    Money, Order, OrderDraft, OrderId, OrderProduct, OrderProductId, Pagination, PaymentId,
    Product, ProductId, UserId,
};
use futures_util::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow};

use super::{PostgresStore, limit_offset, product, to_u32, write_error};
use crate::{OrderRepository, OrderTransaction, Result, StoreError, UnitOfWork};

const ORDER_COLUMNS: &str = "id, user_id, payment_id, customer_name, total_price, total_paid, \
                             total_return, receipt_code, created_at, updated_at";

const LINE_COLUMNS: &str = "id, order_id, product_id, quantity, total_price, created_at, updated_at";

fn row_to_order(row: &PgRow, products: Vec<OrderProduct>) -> Result<Order> {
    Ok(Order {
        id: OrderId::from_i64(row.try_get("id")?),
        user_id: UserId::from_i64(row.try_get("user_id")?),
        payment_id: PaymentId::from_i64(row.try_get("payment_id")?),
        customer_name: row.try_get("customer_name")?,
        total_price: Money::new(row.try_get::<Decimal, _>("total_price")?),
        total_paid: Money::new(row.try_get::<Decimal, _>("total_paid")?),
        total_return: Money::new(row.try_get::<Decimal, _>("total_return")?),
        receipt_code: row.try_get("receipt_code")?,
        products,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        user: None,
        payment: None,
    })
}

fn row_to_line(row: &PgRow) -> Result<OrderProduct> {
    Ok(OrderProduct {
        id: OrderProductId::from_i64(row.try_get("id")?),
        order_id: OrderId::from_i64(row.try_get("order_id")?),
        product_id: ProductId::from_i64(row.try_get("product_id")?),
        quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        total_price: Money::new(row.try_get::<Decimal, _>("total_price")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        product: None,
    })
}

impl PostgresStore {
    /// Loads the lines of every order in `order_ids`, grouped by order.
    async fn lines_for(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<OrderProduct>>> {
        let lines: Vec<OrderProduct> = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM order_products WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(order_ids)
        .fetch(&self.pool)
        .map_err(StoreError::from)
        .and_then(|row| async move { row_to_line(&row) })
        .try_collect()
        .await?;

        let mut grouped: HashMap<i64, Vec<OrderProduct>> = HashMap::new();
        for line in lines {
            grouped.entry(line.order_id.as_i64()).or_default().push(line);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn get_order_by_id(&self, id: OrderId) -> Result<Order> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut lines = self.lines_for(&[id.as_i64()]).await?;
        row_to_order(&row, lines.remove(&id.as_i64()).unwrap_or_default())
    }

    async fn list_orders(&self, page: Pagination) -> Result<Vec<Order>> {
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut lines = self.lines_for(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| row_to_order(row, lines.remove(&id).unwrap_or_default()))
            .collect()
    }
}

/// An open database transaction for creating an order.
///
/// Products read through it are locked with `FOR UPDATE`. Dropping it
/// without committing rolls back.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { tx })
    }
}

#[async_trait]
impl OrderTransaction for PostgresTransaction {
    async fn get_product(&mut self, id: ProductId) -> Result<Product> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            product::COLUMNS
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        product::row_to_product(&row)
    }

    async fn set_stock(&mut self, id: ProductId, stock: u32) -> Result<()> {
        let result =
            sqlx::query("UPDATE products SET stock = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i64())
                .bind(i64::from(stock))
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders
                (user_id, payment_id, customer_name, total_price, total_paid, total_return, receipt_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(draft.user_id.as_i64())
        .bind(draft.payment_id.as_i64())
        .bind(&draft.customer_name)
        .bind(draft.total_price.amount())
        .bind(draft.total_paid.amount())
        .bind(draft.total_return.amount())
        .bind(draft.receipt_code)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?;

        let order_id: i64 = row.try_get("id")?;
        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let line_row = sqlx::query(&format!(
                r#"
                INSERT INTO order_products (order_id, product_id, quantity, total_price)
                VALUES ($1, $2, $3, $4)
                RETURNING {LINE_COLUMNS}
                "#
            ))
            .bind(order_id)
            .bind(line.product_id.as_i64())
            .bind(i64::from(line.quantity))
            .bind(line.total_price.amount())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(write_error)?;

            lines.push(row_to_line(&line_row)?);
        }

        row_to_order(&row, lines)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
