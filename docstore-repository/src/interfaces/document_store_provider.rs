//! Document store provider trait definition.
//!
//! This module defines the abstract interface for backend operations,
//! allowing for different implementations (OpenSearch, Elasticsearch, in-memory fakes).

use async_trait::async_trait;

use crate::errors::DocumentStoreError;
use crate::schema::CollectionSchema;
use crate::types::{BackendInfo, BulkItemOutcome, RawDocument, ScrollPage};
use docstore_shared::FieldChanges;

/// Abstracts the underlying document search backend.
///
/// Implementations are injected into `DocumentStoreClient`. They speak in raw
/// JSON documents and report failures with the `DocumentStoreError` taxonomy;
/// input validation, typing, and cancellation are handled by the client.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Check the backend is alive and report its metadata.
    ///
    /// # Returns
    ///
    /// * `Ok(BackendInfo)` - The backend answered
    /// * `Err(DocumentStoreError::BackendUnavailable)` - It did not answer correctly
    async fn ping(&self) -> Result<BackendInfo, DocumentStoreError>;

    /// Check whether a collection exists.
    async fn collection_exists(&self, collection: &str) -> Result<bool, DocumentStoreError>;

    /// Create a collection with the given schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The collection was created
    /// * `Err(DocumentStoreError::CollectionExists)` - The backend reports it already exists
    /// * `Err(DocumentStoreError)` - Any other failure
    async fn create_collection(
        &self,
        collection: &str,
        schema: &CollectionSchema,
    ) -> Result<(), DocumentStoreError>;

    /// Delete a collection and every record in it.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The collection was deleted
    /// * `Err(DocumentStoreError::CollectionNotFound)` - It did not exist
    async fn delete_collection(&self, collection: &str) -> Result<(), DocumentStoreError>;

    /// Write a document, replacing any existing document with the same id.
    async fn put_document(
        &self,
        collection: &str,
        document: &RawDocument,
    ) -> Result<(), DocumentStoreError>;

    /// Write many documents in one round trip.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BulkItemOutcome>)` - One outcome per document, in input order
    /// * `Err(DocumentStoreError)` - If the bulk request failed as a whole
    async fn bulk_put_documents(
        &self,
        collection: &str,
        documents: &[RawDocument],
    ) -> Result<Vec<BulkItemOutcome>, DocumentStoreError>;

    /// Fetch a document by id; `Ok(None)` when it does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RawDocument>, DocumentStoreError>;

    /// Full-text match `text` against `field`, returning at most `size` hits in
    /// backend relevance order.
    async fn match_documents(
        &self,
        collection: &str,
        field: &str,
        text: &str,
        size: usize,
    ) -> Result<Vec<RawDocument>, DocumentStoreError>;

    /// Start a scan over every document in a collection.
    async fn open_scroll(
        &self,
        collection: &str,
        page_size: usize,
        keep_alive: &str,
    ) -> Result<ScrollPage, DocumentStoreError>;

    /// Fetch the page after the one that produced `cursor`.
    async fn next_scroll(
        &self,
        cursor: &str,
        keep_alive: &str,
    ) -> Result<ScrollPage, DocumentStoreError>;

    /// Release a scan cursor.
    async fn close_scroll(&self, cursor: &str) -> Result<(), DocumentStoreError>;

    /// Merge `changes` into an existing document.
    ///
    /// # Returns
    ///
    /// * `Err(DocumentStoreError::RecordNotFound)` - The document does not exist
    async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        changes: &FieldChanges,
    ) -> Result<(), DocumentStoreError>;

    /// Delete a document by id.
    ///
    /// # Returns
    ///
    /// * `Err(DocumentStoreError::RecordNotFound)` - The document does not exist
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError>;
}
