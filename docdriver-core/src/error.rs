//! Error types and result types for storage driver operations.
//!
//! This module provides the error taxonomy shared by every storage backend.
//! Use [`StorageResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a storage driver.
///
/// The taxonomy covers precondition failures (namespace selection, connection state),
/// not-found results, unsupported capabilities, and backend-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// An empty string was passed where a database or collection name is required.
    #[error("Empty name")]
    EmptyName,
    /// No connection to the underlying storage has been established.
    #[error("Connection not established")]
    NotConnected,
    /// A driver was requested before both database and collection were selected,
    /// or a collection was selected before a database.
    #[error("Database or collection is not selected")]
    NamespaceNotSelected,
    /// A single-result read, update, or remove operation matched zero documents.
    ///
    /// Note that this is the contractual signal for "no match" — callers must
    /// distinguish a valid empty result from a failure solely via this variant.
    #[error("No documents found")]
    NotFound,
    /// The backend does not support the requested capability. This is a permanent
    /// gap, not a transient failure.
    #[error("Not implemented")]
    NotImplemented,
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error reported by the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for storage driver operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<BsonError> for StorageError {
    fn from(err: BsonError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StorageError {
    fn from(err: SerdeJsonError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
