//! Commerce error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error code reported to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing id on lookup or update.
    NotFound,
    /// Name collision.
    DuplicateError,
    /// Invalid numeric input.
    BadData,
    /// Unknown or missing caller identity.
    InvalidToken,
    /// Structurally invalid request or forbidden state change.
    InvalidData,
    /// Storage failure.
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DuplicateError => "DUPLICATE_ERROR",
            ErrorCode::BadData => "BAD_DATA",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidData => "INVALID_DATA",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in bookstore operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Name already taken.
    #[error("{entity} with name \"{name}\" already exists")]
    Duplicate { entity: &'static str, name: String },

    /// Entity is still referenced elsewhere.
    #[error("{entity} {id} is still used by {count} {by}")]
    InUse {
        entity: &'static str,
        id: String,
        by: &'static str,
        count: usize,
    },

    /// Invalid numeric input (negative price, discount out of range, ...).
    #[error("Bad data: {0}")]
    BadData(String),

    /// Invalid request data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Caller identity missing or unknown.
    #[error("Invalid token")]
    InvalidToken,

    /// Not enough copies in stock.
    #[error("Insufficient stock for \"{name}\": requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: i64,
    },

    /// Illegal order status transition.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Shorthand for a not-found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CommerceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// The API error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CommerceError::NotFound { .. } => ErrorCode::NotFound,
            CommerceError::Duplicate { .. } => ErrorCode::DuplicateError,
            CommerceError::BadData(_)
            | CommerceError::InsufficientStock { .. }
            | CommerceError::Overflow
            | CommerceError::CurrencyMismatch { .. } => ErrorCode::BadData,
            CommerceError::InvalidToken => ErrorCode::InvalidToken,
            CommerceError::InUse { .. }
            | CommerceError::InvalidData(_)
            | CommerceError::InvalidTransition { .. } => ErrorCode::InvalidData,
            CommerceError::DatabaseError(_) | CommerceError::SerializationError(_) => {
                ErrorCode::Internal
            }
        }
    }
}

impl From<inkwell_db::DbError> for CommerceError {
    fn from(e: inkwell_db::DbError) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
