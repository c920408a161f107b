//! Account persistence operations on the `accounts` table.

use async_trait::async_trait;
use bookshelf_core::{Account, AccountStore, StoreError};
use bookshelf_crypto::PasswordHash;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::store_error;

/// [`AccountStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Wrap a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO accounts (email, firstname, lastname, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&account.email)
        .bind(&account.firstname)
        .bind(&account.lastname)
        .bind(account.password_hash.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    async fn get_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT email, firstname, lastname, password_hash, created_at
             FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(AccountRow::into_account))
    }

    async fn password_hash(&self, email: &str) -> Result<Option<PasswordHash>, StoreError> {
        let stored =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM accounts WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error)?;
        Ok(stored.map(PasswordHash::from_stored))
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AccountRow {
    email: String,
    firstname: String,
    lastname: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            email: self.email,
            firstname: self.firstname,
            lastname: self.lastname,
            password_hash: PasswordHash::from_stored(self.password_hash),
            created_at: self.created_at,
        }
    }
}
