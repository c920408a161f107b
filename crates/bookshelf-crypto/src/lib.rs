//! # bookshelf-crypto: Credential Verification
//!
//! Turns a plaintext password into a storable salted hash at registration and
//! checks a plaintext password against a stored hash at login.
//!
//! ## Crate Policy
//!
//! - Plaintext never leaves the call that received it. The HTTP layer holds
//!   it in `zeroize::Zeroizing` so it is wiped on drop.
//! - [`PasswordHasher::verify`] never fails outward. Wrong password, malformed
//!   hash and (via [`PasswordHasher::verify_absent`]) unknown account all
//!   collapse to `false` with comparable cost.
//! - Both operations are CPU-bound and blocking. Async callers run them on a
//!   blocking thread.

pub mod error;
pub mod password;

pub use error::HashError;
pub use password::{PasswordHash, PasswordHasher, DEFAULT_COST, MAX_PASSWORD_BYTES};
