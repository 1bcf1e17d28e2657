use async_trait::async_trait;
use common::{Category, CategoryId, NewCategory, Pagination};
use futures_util::TryStreamExt;
use sqlx::{Row, postgres::PgRow};

use super::{PostgresStore, limit_offset, write_error};
use crate::{CategoryRepository, Result, StoreError};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub(super) fn row_to_category(row: &PgRow) -> Result<Category> {
    Ok(Category {
        id: CategoryId::from_i64(row.try_get("id")?),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CategoryRepository for PostgresStore {
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let row = sqlx::query(&format!(
            "INSERT INTO categories (name) VALUES ($1) RETURNING {COLUMNS}"
        ))
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        row_to_category(&row)
    }

    async fn get_category_by_id(&self, id: CategoryId) -> Result<Category> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        row_to_category(&row)
    }

    async fn list_categories(&self, page: Pagination) -> Result<Vec<Category>> {
        let (limit, offset) = limit_offset(page);
        sqlx::query(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch(&self.pool)
        .map_err(StoreError::from)
        .and_then(|row| async move { row_to_category(&row) })
        .try_collect()
        .await
    }

    async fn update_category(&self, category: &Category) -> Result<Category> {
        let row = sqlx::query(&format!(
            "UPDATE categories SET name = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(category.id.as_i64())
        .bind(&category.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or(StoreError::NotFound)?;

        row_to_category(&row)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
