//! # Catalog Records
//!
//! [`Book`] is the stored catalog record keyed by ISBN. [`NewBook`] and
//! [`BookPatch`] are the create and partial-update payloads that feed
//! [`ChangeIntent`](crate::ChangeIntent). [`Account`] is a registered user.

use bookshelf_crypto::PasswordHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored book. The ISBN is the natural key and never changes once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Natural key.
    pub isbn: String,
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Unit price.
    pub price: f64,
}

/// Payload of a create intent. Every column is written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    /// Natural key. Must be non-empty.
    pub isbn: String,
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Unit price.
    pub price: f64,
}

impl NewBook {
    /// Build a create payload, defaulting absent fields to empty / zero.
    pub fn from_parts(
        isbn: impl Into<String>,
        title: Option<String>,
        author: Option<String>,
        price: Option<f64>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            price: price.unwrap_or(0.0),
        }
    }

    /// The record this payload inserts.
    pub fn into_book(self) -> Book {
        Book {
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            price: self.price,
        }
    }
}

/// Payload of a partial-update intent. `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookPatch {
    /// ISBN of the record to update. Must be non-empty.
    pub isbn: String,
    /// New title, if supplied.
    pub title: Option<String>,
    /// New author, if supplied.
    pub author: Option<String>,
    /// New price, if supplied.
    pub price: Option<f64>,
}

impl BookPatch {
    /// A patch for `isbn` that changes nothing yet.
    pub fn new(isbn: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the price.
    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// A registered account.
///
/// `password_hash` is a [`PasswordHash`]: new accounts take it from
/// [`PasswordHasher::hash`](bookshelf_crypto::PasswordHasher::hash) via
/// [`Account::register`], stores rebuild it with
/// [`PasswordHash::from_stored`]. `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Natural key.
    pub email: String,
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Salted password hash.
    pub password_hash: PasswordHash,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// A new account registered now with a freshly computed hash.
    pub fn register(
        email: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            email: email.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}
