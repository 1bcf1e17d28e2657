use async_trait::async_trait;
use common::{CategoryId, Money, NewProduct, Pagination, Product, ProductFilter, ProductId};
use futures_util::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::{PostgresStore, limit_offset, to_u32, write_error};
use crate::{ProductRepository, Result, StoreError};

pub(super) const COLUMNS: &str =
    "id, category_id, sku, name, image, stock, price, created_at, updated_at";

pub(super) fn row_to_product(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_i64(row.try_get("id")?),
        category_id: CategoryId::from_i64(row.try_get("category_id")?),
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        image: row.try_get("image")?,
        stock: to_u32(row.try_get("stock")?, "stock")?,
        price: Money::new(row.try_get::<Decimal, _>("price")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        category: None,
    })
}

/// Builds an `ILIKE` substring pattern, escaping wildcards in `search`.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (category_id, sku, name, image, stock, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(product.category_id.as_i64())
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(&product.image)
        .bind(i64::from(product.stock))
        .bind(product.price.amount())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        row_to_product(&row)
    }

    async fn get_product_by_id(&self, id: ProductId) -> Result<Product> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        row_to_product(&row)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Vec<Product>> {
        let (limit, offset) = limit_offset(page);
        let pattern = filter.search.as_deref().map(like_pattern);

        sqlx::query(&format!(
            r#"
            SELECT {COLUMNS} FROM products
            WHERE ($1::BIGINT IS NULL OR category_id = $1)
              AND ($2::TEXT IS NULL OR name ILIKE $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.category_id.map(|id| id.as_i64()))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch(&self.pool)
        .map_err(StoreError::from)
        .and_then(|row| async move { row_to_product(&row) })
        .try_collect()
        .await
    }

    async fn update_product(&self, product: &Product) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET category_id = $2, name = $3, image = $4, stock = $5, price = $6, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(product.id.as_i64())
        .bind(product.category_id.as_i64())
        .bind(&product.name)
        .bind(&product.image)
        .bind(i64::from(product.stock))
        .bind(product.price.amount())
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or(StoreError::NotFound)?;

        row_to_product(&row)
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tea"), "%tea%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
