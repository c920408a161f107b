#![deny(missing_docs)]

//! # bookshelf-core: Catalog Domain and Batch Mutation
//!
//! Foundational types for the bookshelf service. The API crate builds on
//! this one; its only internal dependency is `bookshelf-crypto`, whose
//! `PasswordHash` is the type of [`Account::password_hash`].
//!
//! ## Design Principles
//!
//! 1. **Presence is explicit.** A [`BookPatch`] carries `Option` per field, so
//!    "leave unchanged" and "set to zero" are distinct values. The
//!    [`FieldMergePolicy`] decides how a patch collapses into a [`FieldSet`].
//!
//! 2. **One write per item.** The [`BatchProcessor`] issues exactly one store
//!    call per intent, in input order, and never aborts a batch because one
//!    item failed. Per-item failures become [`Outcome`] messages.
//!
//! 3. **Storage is a seam.** [`RecordStore`] and [`AccountStore`] are async
//!    traits. [`MemoryStore`] implements both for development and tests; the
//!    API crate provides the PostgreSQL implementations.

pub mod batch;
pub mod book;
pub mod error;
pub mod intent;
pub mod memory;
pub mod outcome;
pub mod store;

pub use batch::BatchProcessor;
pub use book::{Account, Book, BookPatch, NewBook};
pub use error::{ItemError, StoreError};
pub use intent::{BookColumn, ChangeIntent, FieldMergePolicy, FieldSet, FieldValue};
pub use memory::MemoryStore;
pub use outcome::{BatchReport, Outcome, OutcomeKind};
pub use store::{AccountStore, RecordStore};
