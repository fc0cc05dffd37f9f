use thiserror::Error;

use crate::memory::FailPoint;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An inserted row referenced a parent row that does not exist.
    #[error("Missing reference: {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i32 },

    /// A stored row could not be mapped onto its domain type.
    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A failure armed on the in-memory store fired.
    #[error("Injected failure at {0:?}")]
    Injected(FailPoint),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
