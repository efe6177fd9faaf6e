//! Persistence for the supplier catalog.
//!
//! # Database: `PostgreSQL`
//!
//! ## Tables
//!
//! - `supplier` - Suppliers (unique document)
//! - `address` - One address per supplier, deleted with it
//! - `product` - Products, each referencing an existing supplier
//! - `app_user` - Login identities
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Repositories
//!
//! Each entity has an async repository trait. Handlers and services only see
//! the traits (bundled in [`Repositories`]); the `PostgreSQL` implementations
//! live next to each trait and [`memory::InMemoryStore`] implements all of
//! them for tests and local runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p fornecedores-cli -- migrate
//! ```

pub mod addresses;
pub mod memory;
pub mod products;
pub mod suppliers;
pub mod users;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::{AddressRepository, PgAddressRepository};
pub use memory::InMemoryStore;
pub use products::{PgProductRepository, ProductRepository};
pub use suppliers::{PgSupplierRepository, SupplierRepository};
pub use users::{PgUserRepository, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate document, missing supplier).
    #[error("constraint violation: {0}")]
    Conflict(Constraint),
}

/// The kind of constraint a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The primary key is already taken.
    DuplicateId,
    /// A unique business key is taken: supplier document or user email.
    DuplicateKey,
    /// A referenced row is missing, or a referencing row blocks a delete.
    Reference,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DuplicateId => "id already registered",
            Self::DuplicateKey => "unique key already registered",
            Self::Reference => "reference violated",
        })
    }
}

/// Map constraint violations from sqlx into `RepositoryError::Conflict`.
///
/// Primary keys use `PostgreSQL`'s default `{table}_pkey` constraint names.
pub(crate) fn map_constraint_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let primary_key = db_err
                .constraint()
                .is_some_and(|name| name.ends_with("_pkey"));
            return RepositoryError::Conflict(if primary_key {
                Constraint::DuplicateId
            } else {
                Constraint::DuplicateKey
            });
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(Constraint::Reference);
        }
    }
    RepositoryError::Database(e)
}

/// The repository set shared by all handlers.
///
/// Cheap to clone: every field is an `Arc` over a trait object.
#[derive(Clone)]
pub struct Repositories {
    pub suppliers: Arc<dyn SupplierRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Repositories backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            suppliers: Arc::new(PgSupplierRepository::new(pool.clone())),
            addresses: Arc::new(PgAddressRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
        }
    }

    /// Repositories backed by a single in-memory store.
    #[must_use]
    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            suppliers: Arc::new(store.clone()),
            addresses: Arc::new(store.clone()),
            products: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
