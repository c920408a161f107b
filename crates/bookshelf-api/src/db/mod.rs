//! # Database Persistence Layer
//!
//! PostgreSQL implementations of the store traits via SQLx.
//!
//! ## Architecture
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, books and
//! accounts are persisted to PostgreSQL. When absent, the API runs on the
//! in-memory store (suitable for development and testing).
//!
//! Connections are drawn from the pool per statement and returned when the
//! statement completes; no handler holds a connection across items.

pub mod accounts;
pub mod books;

pub use accounts::PgAccountStore;
pub use books::PgRecordStore;

use bookshelf_core::StoreError;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect to PostgreSQL and apply the embedded migrations.
pub async fn init_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Translate a driver error into the store error surfaced to callers.
///
/// Unique violations become [`StoreError::Conflict`] carrying the database
/// message; everything else is a backend failure.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    tracing::error!(error = %err, "database operation failed");
    StoreError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_backend_failures() {
        let err = store_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn pool_timeout_is_backend_failure() {
        let err = store_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("timed out")));
    }
}
