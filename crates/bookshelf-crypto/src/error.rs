//! # Credential Error Types

use thiserror::Error;

/// Failure to produce a password hash.
#[derive(Error, Debug)]
pub enum HashError {
    /// The password exceeds what bcrypt can hash without truncation.
    #[error("password is {len} bytes; at most {max} bytes are supported")]
    TooLong { len: usize, max: usize },

    /// The configured cost is outside bcrypt's accepted range.
    #[error("bcrypt cost {0} is out of range (4..=31)")]
    InvalidCost(u32),

    /// The bcrypt primitive rejected the input.
    #[error("bcrypt failure: {0}")]
    Primitive(#[from] bcrypt::BcryptError),
}
