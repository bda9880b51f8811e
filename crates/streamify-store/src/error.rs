//! Error types for document store operations.

use thiserror::Error;

use streamify_types::PairKey;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with this id exists in the collection.
    #[error("{collection} not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// A friend request already exists for this unordered pair of users.
    #[error("a friend request already exists for pair {0:?}")]
    DuplicatePair(PairKey),

    /// The document update would break an invariant of the collection.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// The store call did not complete before its deadline.
    #[error("store operation timed out: {operation}")]
    Timeout { operation: &'static str },

    /// Seed data could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading seed data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend failed (connection loss, poisoned lock, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn user_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            collection: "user",
            id: id.to_string(),
        }
    }

    pub fn request_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            collection: "friend request",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
