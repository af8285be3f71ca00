//! Persistence seams.
//!
//! Each store is an `async_trait` so services can run against PostgreSQL in
//! production and against mocks or in-memory fakes in tests.

use thiserror::Error;

pub mod auth;
pub mod pickup_point;
pub mod reception;

pub use auth::{CredentialStore, PgCredentialStore};
pub use pickup_point::{PgPickupPointRepository, PickupPointRepository};
pub use reception::{PgReceptionRepository, ReceptionRepository};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    /// The addressed row, or a row it references, does not exist.
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            _ => StoreError::Database(err),
        }
    }
}
