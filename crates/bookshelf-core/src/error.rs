//! # Error Types
//!
//! Per-item failures of a batch ([`ItemError`]) and failures reported by a
//! record store ([`StoreError`]). Item errors never escape a batch; they are
//! rendered into the item's [`Outcome`](crate::Outcome) message.

use thiserror::Error;

/// Failure of a single store operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write violated a uniqueness constraint (duplicate ISBN or email).
    #[error("{0}")]
    Conflict(String),

    /// Any other storage failure: connectivity, constraint, encoding.
    #[error("{0}")]
    Backend(String),
}

/// Why a single item of a batch did not apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// The intent was rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    /// The store rejected the write.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// An update matched zero rows.
    #[error("Book {isbn} not found, nothing was altered.")]
    NotApplied {
        /// ISBN the update was keyed on.
        isbn: String,
    },
}
