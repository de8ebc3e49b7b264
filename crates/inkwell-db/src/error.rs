//! Database error types.

use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database file.
    #[error("Failed to open database: {0}")]
    OpenError(String),

    /// Failed to write the database snapshot.
    #[error("Failed to persist database: {0}")]
    PersistError(String),

    /// A document with the same id already exists.
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// No document with the given id.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Failed to convert a document to or from JSON.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A writer panicked while holding the store lock.
    #[error("Database lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::SerializationError(e.to_string())
    }
}
