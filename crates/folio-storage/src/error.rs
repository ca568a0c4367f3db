//! Error types for folio-storage

use folio_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Validation, not-found and precondition failures from the domain layer
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] time::error::ComponentRange),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
