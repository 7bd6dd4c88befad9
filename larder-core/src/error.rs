//! Error types for the larder core library.

use thiserror::Error;

/// Top-level error type for all inventory operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input failed validation before reaching the store.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A food item with the given ID was not found.
    #[error("Food item not found: {0}")]
    FoodNotFound(crate::FoodId),

    /// A user with the given ID was not found.
    #[error("User not found: {0}")]
    UserNotFound(crate::UserId),

    /// A unique constraint would be violated (e.g. duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
