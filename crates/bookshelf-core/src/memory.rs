//! # In-Memory Store
//!
//! Implements [`RecordStore`] and [`AccountStore`] over shared maps. Used when
//! no database is configured and as the default backend in tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::book::{Account, Book};
use crate::error::StoreError;
use crate::intent::FieldSet;
use crate::store::{AccountStore, RecordStore};

/// Thread-safe, cloneable in-memory store.
///
/// Locks are `parking_lot` and are never held across an `.await`, so every
/// trait method completes synchronously. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    books: Arc<RwLock<BTreeMap<String, Book>>>,
    accounts: Arc<RwLock<BTreeMap<String, Account>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored books.
    pub fn book_count(&self) -> usize {
        self.books.read().len()
    }

    /// Number of stored accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, book: &Book) -> Result<(), StoreError> {
        let mut books = self.books.write();
        if books.contains_key(&book.isbn) {
            return Err(StoreError::Conflict(format!(
                "book {} already exists",
                book.isbn
            )));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(())
    }

    async fn update_fields(&self, isbn: &str, fields: &FieldSet) -> Result<u64, StoreError> {
        match self.books.write().get_mut(isbn) {
            Some(book) => {
                fields.apply_to(book);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.books.read().get(isbn).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.books.read().values().cloned().collect())
    }

    async fn delete(&self, isbn: &str) -> Result<u64, StoreError> {
        Ok(u64::from(self.books.write().remove(isbn).is_some()))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.email) {
            return Err(StoreError::Conflict(format!(
                "account {} already exists",
                account.email
            )));
        }
        accounts.insert(account.email.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().get(email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookPatch;
    use crate::intent::FieldMergePolicy;
    use bookshelf_crypto::PasswordHash;

    fn book(isbn: &str) -> Book {
        Book {
            isbn: isbn.to_string(),
            title: "Title".to_string(),
            author: "Author".to_string(),
            price: 10.0,
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = MemoryStore::new();
        store.insert(&book("A")).await.unwrap();
        assert_eq!(store.get("A").await.unwrap(), Some(book("A")));
        assert_eq!(store.book_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        store.insert(&book("A")).await.unwrap();
        let err = store.insert(&book("A")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_record_affects_zero_rows() {
        let store = MemoryStore::new();
        let fields = FieldMergePolicy::Explicit.merge(&BookPatch::new("A").title("T"));
        assert_eq!(store.update_fields("A", &fields).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_update_reports_existence() {
        let store = MemoryStore::new();
        store.insert(&book("A")).await.unwrap();
        assert_eq!(store.update_fields("A", &FieldSet::new()).await.unwrap(), 1);
        assert_eq!(store.get("A").await.unwrap(), Some(book("A")));
    }

    #[tokio::test]
    async fn list_is_ordered_by_isbn() {
        let store = MemoryStore::new();
        for isbn in ["C", "A", "B"] {
            store.insert(&book(isbn)).await.unwrap();
        }
        let isbns: Vec<String> = store.list().await.unwrap().into_iter().map(|b| b.isbn).collect();
        assert_eq!(isbns, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn delete_reports_rows_removed() {
        let store = MemoryStore::new();
        store.insert(&book("A")).await.unwrap();
        assert_eq!(store.delete("A").await.unwrap(), 1);
        assert_eq!(store.delete("A").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.insert(&book("A")).await.unwrap();
        assert_eq!(store.book_count(), 1);
    }

    #[tokio::test]
    async fn accounts_are_unique_by_email() {
        let store = MemoryStore::new();
        let account = Account::register(
            "a@example.com",
            "A",
            "B",
            PasswordHash::from_stored("hash"),
        );
        store.insert_account(&account).await.unwrap();
        assert!(matches!(
            store.insert_account(&account).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(
            store.password_hash("a@example.com").await.unwrap(),
            Some(PasswordHash::from_stored("hash"))
        );
        assert!(store.password_hash("b@example.com").await.unwrap().is_none());
        assert_eq!(store.account_count(), 1);
    }
}
