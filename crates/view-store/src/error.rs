use thiserror::Error;

/// Errors that can occur when interacting with the view or checkpoint
/// stores.
#[derive(Debug, Error)]
pub enum ViewStoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for view store operations.
pub type Result<T> = std::result::Result<T, ViewStoreError>;
