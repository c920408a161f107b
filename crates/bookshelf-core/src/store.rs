//! # Store Traits
//!
//! The storage seam of the service. Implementations must be `Send + Sync` so
//! they can be shared across request tasks behind an `Arc`; both traits are
//! object-safe so the API can choose a backend at startup.
//!
//! Writes are single statements. No implementation may span a transaction
//! across calls: each batch item is its own unit of work.

use async_trait::async_trait;
use bookshelf_crypto::PasswordHash;

use crate::book::{Account, Book};
use crate::error::StoreError;
use crate::intent::FieldSet;

/// Durable storage for books.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. A duplicate ISBN is a [`StoreError::Conflict`].
    async fn insert(&self, book: &Book) -> Result<(), StoreError>;

    /// Write `fields` to the record keyed by `isbn`.
    ///
    /// Returns the number of rows affected; `0` means no such record. An empty
    /// field set still reports whether the record exists.
    async fn update_fields(&self, isbn: &str, fields: &FieldSet) -> Result<u64, StoreError>;

    /// Fetch one record.
    async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Fetch every record, ordered by ISBN.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    /// Delete one record, returning the number of rows removed.
    async fn delete(&self, isbn: &str) -> Result<u64, StoreError>;
}

/// Durable storage for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. A duplicate email is a [`StoreError::Conflict`].
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Fetch an account by email.
    async fn get_account(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Fetch only the stored password hash for `email`.
    async fn password_hash(&self, email: &str) -> Result<Option<PasswordHash>, StoreError> {
        Ok(self.get_account(email).await?.map(|a| a.password_hash))
    }
}
