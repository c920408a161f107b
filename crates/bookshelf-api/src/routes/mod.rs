//! # API Route Modules
//!
//! - `books`: JSON book catalog: listing, lookup, batch create, batch
//!   partial update, single-record patch and delete.
//! - `accounts`: server-rendered home, about, login and registration pages.

pub mod accounts;
pub mod books;
