use async_trait::async_trait;
use common::{NewUser, Pagination, User, UserId, UserRole};
use futures_util::TryStreamExt;
use sqlx::{Row, postgres::PgRow};

use super::{PostgresStore, limit_offset, write_error};
use crate::{Result, StoreError, UserRepository};

const COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";

fn row_to_user(row: &PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: UserId::from_i64(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role: role
            .parse::<UserRole>()
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        row_to_user(&row)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        row_to_user(&row)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        row_to_user(&row)
    }

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>> {
        let (limit, offset) = limit_offset(page);
        sqlx::query(&format!(
            "SELECT {COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch(&self.pool)
        .map_err(StoreError::from)
        .and_then(|row| async move { row_to_user(&row) })
        .try_collect()
        .await
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET name = $2, email = $3, password = $4, role = $5, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user.id.as_i64())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or(StoreError::NotFound)?;

        row_to_user(&row)
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
