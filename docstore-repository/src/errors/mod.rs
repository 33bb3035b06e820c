//! Error types for the document store repository.

mod document_store_error;

pub use document_store_error::DocumentStoreError;
