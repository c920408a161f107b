//! # Password Hashing
//!
//! bcrypt with a fixed cost per [`PasswordHasher`]. The salt is generated per
//! hash and embedded in the output alongside the cost, so verification needs
//! nothing but the stored string.

use crate::error::HashError;

/// Cost used in production. Each increment doubles the work factor.
pub const DEFAULT_COST: u32 = 12;

/// bcrypt only reads the first 72 bytes of its input. Longer passwords are
/// rejected instead of silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Input for the dummy hash used to equalize timing on the unknown-account path.
const DUMMY_PASSWORD: &str = "bookshelf-absent-account";

/// A stored password hash (`$2b$<cost>$<salt><digest>`). `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// The encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded hash, for storage.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy: PasswordHash,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// A hasher at [`DEFAULT_COST`].
    pub fn new() -> Result<Self, HashError> {
        Self::with_cost(DEFAULT_COST)
    }

    /// A hasher at `cost`. Computes one dummy hash up front, so construction
    /// takes as long as a single [`hash`](Self::hash).
    pub fn with_cost(cost: u32) -> Result<Self, HashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HashError::InvalidCost(cost));
        }
        let dummy = PasswordHash(bcrypt::hash(DUMMY_PASSWORD, cost)?);
        Ok(Self { cost, dummy })
    }

    /// The bcrypt cost in use.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `plaintext` with a fresh salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, HashError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong {
                len: plaintext.len(),
                max: MAX_PASSWORD_BYTES,
            });
        }
        Ok(PasswordHash(bcrypt::hash(plaintext, self.cost)?))
    }

    /// Whether `plaintext` matches `hashed`.
    ///
    /// Every failure mode returns `false` after doing a full bcrypt
    /// computation, so callers cannot tell a malformed hash from a wrong
    /// password by result or by timing.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return self.verify_absent(plaintext);
        }
        match bcrypt::verify(plaintext, hashed) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be parsed");
                self.verify_absent(plaintext)
            }
        }
    }

    /// Burn one verification against the dummy hash and return `false`.
    ///
    /// Used when no account exists for the supplied identifier, so that path
    /// costs the same as a wrong password.
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        let _ = bcrypt::verify(plaintext, self.dummy.as_str());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(MIN_COST).expect("minimum cost is valid")
    }

    #[test]
    fn verify_accepts_the_hashed_password() {
        let h = hasher();
        let hashed = h.hash("secret").unwrap();
        assert!(h.verify("secret", hashed.as_str()));
    }

    #[test]
    fn verify_is_case_sensitive() {
        let h = hasher();
        let hashed = h.hash("secret").unwrap();
        assert!(!h.verify("Secret", hashed.as_str()));
    }

    #[test]
    fn verify_rejects_other_password() {
        let h = hasher();
        let hashed = h.hash("correct horse").unwrap();
        assert!(!h.verify("battery staple", hashed.as_str()));
    }

    #[test]
    fn malformed_hash_is_false_not_error() {
        let h = hasher();
        assert!(!h.verify("secret", "not-a-bcrypt-hash"));
        assert!(!h.verify("secret", ""));
    }

    #[test]
    fn verify_absent_is_always_false() {
        let h = hasher();
        assert!(!h.verify_absent("bookshelf-absent-account"));
        assert!(!h.verify_absent("anything"));
    }

    #[test]
    fn hashes_are_salted() {
        let h = hasher();
        let a = h.hash("secret").unwrap();
        let b = h.hash("secret").unwrap();
        assert_ne!(a, b);
        assert!(h.verify("secret", a.as_str()));
        assert!(h.verify("secret", b.as_str()));
    }

    #[test]
    fn hash_embeds_cost_and_never_contains_plaintext() {
        let h = hasher();
        let hashed = h.hash("plaintext-marker").unwrap();
        assert!(hashed.as_str().starts_with("$2b$04$"));
        assert!(!hashed.as_str().contains("plaintext-marker"));
    }

    #[test]
    fn overlong_password_is_rejected() {
        let h = hasher();
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(
            h.hash(&long),
            Err(HashError::TooLong { len: 73, max: 72 })
        ));
    }

    #[test]
    fn overlong_attempt_does_not_match_truncated_prefix() {
        let h = hasher();
        let exact = "y".repeat(MAX_PASSWORD_BYTES);
        let hashed = h.hash(&exact).unwrap();
        let longer = format!("{exact}z");
        assert!(!h.verify(&longer, hashed.as_str()));
    }

    #[test]
    fn cost_out_of_range_is_rejected() {
        assert!(matches!(
            PasswordHasher::with_cost(3),
            Err(HashError::InvalidCost(3))
        ));
        assert!(matches!(
            PasswordHasher::with_cost(32),
            Err(HashError::InvalidCost(32))
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let h = hasher();
        let hashed = h.hash("secret").unwrap();
        assert_eq!(format!("{hashed:?}"), "PasswordHash([REDACTED])");
        assert!(!format!("{h:?}").contains("$2b$"));
    }

    #[test]
    fn stored_hash_round_trips_through_string() {
        let h = hasher();
        let stored = h.hash("secret").unwrap().into_string();
        let restored = PasswordHash::from_stored(stored);
        assert!(h.verify("secret", restored.as_str()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn hash_then_verify_accepts_same_password(p in "\\PC{0,18}") {
            prop_assume!(p.len() <= MAX_PASSWORD_BYTES);
            let h = hasher();
            let hashed = h.hash(&p).unwrap();
            prop_assert!(h.verify(&p, hashed.as_str()));
        }

        #[test]
        fn hash_then_verify_rejects_other_password(
            p in "[ -~]{0,72}",
            q in "[ -~]{0,72}"
        ) {
            prop_assume!(p != q);
            let h = hasher();
            let hashed = h.hash(&q).unwrap();
            prop_assert!(!h.verify(&p, hashed.as_str()));
        }
    }
}
