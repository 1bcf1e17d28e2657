//! PostgreSQL adapter for the repository ports.

mod category;
mod order;
mod payment;
mod product;
mod user;

use sqlx::PgPool;

use crate::StoreError;

pub use order::PostgresTransaction;

/// PostgreSQL-backed store implementing every repository port.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

/// Maps a failed write, turning unique violations into conflicts.
fn write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string());
    }
    StoreError::Database(err)
}

/// Converts a `BIGINT` quantity column to the model's unsigned type.
fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::DataCorruption(format!("{column} out of range: {value}")))
}

fn limit_offset(page: common::Pagination) -> (i64, i64) {
    (page.limit as i64, page.offset() as i64)
}
