//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Every collaborator is constructed once at startup
//! and injected here; nothing lives at process scope.
//!
//! ## Backends
//!
//! - **PostgreSQL** when `DATABASE_URL` is set ([`crate::db`]).
//! - **In-memory** otherwise ([`bookshelf_core::MemoryStore`]). State does not
//!   survive restarts in this mode.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bookshelf_core::{AccountStore, BatchProcessor, FieldMergePolicy, MemoryStore, RecordStore};
use bookshelf_crypto::{HashError, PasswordHasher, DEFAULT_COST};
use thiserror::Error;

// -- Configuration ------------------------------------------------------------

/// Invalid environment configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("{name} has invalid value {value:?}: expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Application configuration.
///
/// Custom `Debug` redacts the `database_url`, which carries credentials.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// PostgreSQL connection string. `None` selects the in-memory backend.
    pub database_url: Option<String>,
    /// bcrypt cost for new password hashes.
    pub bcrypt_cost: u32,
    /// Maximum number of items accepted in one batch request.
    pub max_batch_size: usize,
    /// Per-request timeout applied by the HTTP layer.
    pub request_timeout: Duration,
    /// How partial updates treat a zero price.
    pub merge_policy: FieldMergePolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_batch_size", &self.max_batch_size)
            .field("request_timeout", &self.request_timeout)
            .field("merge_policy", &self.merge_policy)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            bcrypt_cost: DEFAULT_COST,
            max_batch_size: 100,
            request_timeout: Duration::from_secs(30),
            merge_policy: FieldMergePolicy::Explicit,
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// - `PORT` (default 8080)
    /// - `DATABASE_URL` (unset → in-memory)
    /// - `BCRYPT_COST` (default 12)
    /// - `MAX_BATCH_SIZE` (default 100, must be > 0)
    /// - `REQUEST_TIMEOUT_SECS` (default 30, must be > 0)
    /// - `LEGACY_ZERO_PRICE` (`true`/`false`, default false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT", defaults.port, "a port number")?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let bcrypt_cost = parse_var(&lookup, "BCRYPT_COST", defaults.bcrypt_cost, "an integer")?;
        let max_batch_size: usize = parse_var(
            &lookup,
            "MAX_BATCH_SIZE",
            defaults.max_batch_size,
            "a positive integer",
        )?;
        if max_batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_BATCH_SIZE",
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }
        let timeout_secs: u64 = parse_var(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
            "a positive integer",
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }
        let legacy_zero_price: bool =
            parse_var(&lookup, "LEGACY_ZERO_PRICE", false, "true or false")?;

        Ok(Self {
            port,
            database_url,
            bcrypt_cost,
            max_batch_size,
            request_timeout: Duration::from_secs(timeout_secs),
            merge_policy: if legacy_zero_price {
                FieldMergePolicy::LegacyZeroIsAbsent
            } else {
                FieldMergePolicy::Explicit
            },
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
            expected,
        }),
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: every collaborator sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Book storage.
    pub books: Arc<dyn RecordStore>,
    /// Account storage.
    pub accounts: Arc<dyn AccountStore>,
    /// Credential verifier.
    pub hasher: Arc<PasswordHasher>,
    /// Batch mutation processor configured with the merge policy.
    pub processor: BatchProcessor,
    /// Configuration.
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hasher", &self.hasher)
            .field("processor", &self.processor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State over explicit store implementations.
    pub fn with_stores(
        config: AppConfig,
        books: Arc<dyn RecordStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Result<Self, HashError> {
        let hasher = PasswordHasher::with_cost(config.bcrypt_cost)?;
        Ok(Self {
            books,
            accounts,
            hasher: Arc::new(hasher),
            processor: BatchProcessor::new(config.merge_policy),
            config,
        })
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Result<Self, HashError> {
        let store = MemoryStore::new();
        Self::with_stores(config, Arc::new(store.clone()), Arc::new(store))
    }
}
