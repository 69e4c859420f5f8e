use common::UserId;
use thiserror::Error;

/// Errors that can occur when reading or writing the read model.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another incomplete cart is already stored for this user.
    #[error("User {user_id} already has an incomplete shopping cart")]
    IncompleteCartExists { user_id: UserId },

    /// A stored row cannot be turned back into an aggregate.
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for read model operations.
pub type Result<T> = std::result::Result<T, StoreError>;
