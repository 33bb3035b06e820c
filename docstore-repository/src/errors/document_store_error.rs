//! Document store error types.
//!
//! This module defines the error types that can occur during collection and
//! record operations.

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    /// The connection configuration or transport could not be set up.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend could not be reached or did not answer correctly.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A collection with this name already exists.
    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    /// The collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// The record does not exist in the collection.
    #[error("Record not found: collection={collection}, id={id}")]
    RecordNotFound { collection: String, id: String },

    /// Validation error (e.g., missing required fields).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// A record could not be converted to or from its stored form.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The backend answered with an unexpected status or a malformed body.
    #[error("Backend error (status {status}): {reason}")]
    BackendError { status: u16, reason: String },

    /// The caller cancelled the request or its deadline elapsed.
    #[error("Request cancelled: {0}")]
    Cancelled(String),
}

impl DocumentStoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a backend unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create a collection exists error.
    pub fn collection_exists(collection: impl Into<String>) -> Self {
        Self::CollectionExists(collection.into())
    }

    /// Create a collection not found error.
    pub fn collection_not_found(collection: impl Into<String>) -> Self {
        Self::CollectionNotFound(collection.into())
    }

    /// Create a record not found error.
    pub fn record_not_found(collection: &str, id: &str) -> Self {
        Self::RecordNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a backend error from a status code and the backend's reason.
    pub fn backend(status: u16, reason: impl Into<String>) -> Self {
        Self::BackendError {
            status,
            reason: reason.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// A stable short name for the failure kind, suitable for reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionError(_) => "connection",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::CollectionExists(_) => "collection_exists",
            Self::CollectionNotFound(_) => "collection_not_found",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::ValidationError(_) => "validation",
            Self::BatchSizeExceeded { .. } => "batch_size_exceeded",
            Self::SerializationError(_) => "serialization",
            Self::BackendError { .. } => "backend",
            Self::Cancelled(_) => "cancelled",
        }
    }

    /// Check if this error means the record is absent.
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}

impl From<serde_json::Error> for DocumentStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_message() {
        let err = DocumentStoreError::record_not_found("person", "p1001");

        assert_eq!(
            err.to_string(),
            "Record not found: collection=person, id=p1001"
        );
        assert_eq!(err.kind(), "record_not_found");
        assert!(err.is_record_not_found());
    }

    #[test]
    fn test_backend_error_carries_status_and_reason() {
        let err = DocumentStoreError::backend(400, "mapper_parsing_exception");

        assert!(matches!(
            err,
            DocumentStoreError::BackendError { status: 400, .. }
        ));
        assert_eq!(
            err.to_string(),
            "Backend error (status 400): mapper_parsing_exception"
        );
        assert_eq!(err.kind(), "backend");
    }

    #[test]
    fn test_serde_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: DocumentStoreError = parse.unwrap_err().into();

        assert_eq!(err.kind(), "serialization");
    }
}
