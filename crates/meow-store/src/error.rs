use common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when reading the system of record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store refused the request without a database error.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Every store failure means the system of record could not answer.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BackendUnavailable
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
