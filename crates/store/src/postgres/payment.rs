use async_trait::async_trait;
use common::{NewPayment, Pagination, Payment, PaymentId, PaymentType};
use futures_util::TryStreamExt;
use sqlx::{Row, postgres::PgRow};

use super::{PostgresStore, limit_offset, write_error};
use crate::{PaymentRepository, Result, StoreError};

const COLUMNS: &str = "id, name, type, logo, created_at, updated_at";

fn row_to_payment(row: &PgRow) -> Result<Payment> {
    let payment_type: String = row.try_get("type")?;
    Ok(Payment {
        id: PaymentId::from_i64(row.try_get("id")?),
        name: row.try_get("name")?,
        payment_type: payment_type
            .parse::<PaymentType>()
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?,
        logo: row.try_get("logo")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl PaymentRepository for PostgresStore {
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        let row = sqlx::query(&format!(
            "INSERT INTO payments (name, type, logo) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(&payment.name)
        .bind(payment.payment_type.as_str())
        .bind(&payment.logo)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        row_to_payment(&row)
    }

    async fn get_payment_by_id(&self, id: PaymentId) -> Result<Payment> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        row_to_payment(&row)
    }

    async fn list_payments(&self, page: Pagination) -> Result<Vec<Payment>> {
        let (limit, offset) = limit_offset(page);
        sqlx::query(&format!(
            "SELECT {COLUMNS} FROM payments ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch(&self.pool)
        .map_err(StoreError::from)
        .and_then(|row| async move { row_to_payment(&row) })
        .try_collect()
        .await
    }

    async fn update_payment(&self, payment: &Payment) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments SET name = $2, type = $3, logo = $4, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(payment.id.as_i64())
        .bind(&payment.name)
        .bind(payment.payment_type.as_str())
        .bind(&payment.logo)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or(StoreError::NotFound)?;

        row_to_payment(&row)
    }

    async fn delete_payment(&self, id: PaymentId) -> Result<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
