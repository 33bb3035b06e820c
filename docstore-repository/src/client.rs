//! Document store client implementation.
//!
//! This module provides the main client for interacting with the document store.
//! Application code uses this to manage collections and to write, read, search,
//! update, and delete records.

use std::sync::Arc;

use futures::stream::{self, Stream};
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, DocumentStoreConfig};
use crate::context::RequestContext;
use crate::errors::DocumentStoreError;
use crate::interfaces::DocumentStoreProvider;
use crate::opensearch::OpenSearchProvider;
use crate::schema::CollectionSchema;
use crate::types::{BackendInfo, BatchOperationResult, BatchOperationSummary, RawDocument, ScrollPage};
use docstore_shared::{FieldChanges, Record};

/// The main client for interacting with the document store.
///
/// The client holds no state beyond its provider and configuration, so a
/// single instance can be shared (e.g. behind an `Arc`) by any number of
/// concurrent callers.
pub struct DocumentStoreClient {
    provider: Arc<dyn DocumentStoreProvider>,
    config: DocumentStoreConfig,
}

/// Where a `list_all` scan is.
enum ScanState {
    Start,
    Reading {
        cursor: Option<ScanCursor>,
        documents: std::vec::IntoIter<RawDocument>,
        /// The backend gave no cursor for this page, so no page follows it.
        last: bool,
    },
    Done,
}

/// An open backend scan cursor.
///
/// Dropping it unreleased hands the release to a background task, so a
/// stream abandoned mid-scan does not hold the cursor until it expires.
struct ScanCursor {
    provider: Arc<dyn DocumentStoreProvider>,
    id: String,
    released: bool,
}

impl ScanCursor {
    fn new(provider: Arc<dyn DocumentStoreProvider>, id: String) -> Self {
        Self {
            provider,
            id,
            released: false,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// Release the cursor, logging rather than failing if that goes wrong.
    async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.provider.close_scroll(&self.id).await {
            warn!(error = %e, "Failed to release scan cursor");
        }
    }
}

impl Drop for ScanCursor {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("Scan cursor dropped outside a runtime; left to expire");
            return;
        };
        let provider = self.provider.clone();
        let id = std::mem::take(&mut self.id);
        runtime.spawn(async move {
            if let Err(e) = provider.close_scroll(&id).await {
                warn!(error = %e, "Failed to release abandoned scan cursor");
            }
        });
    }
}

impl DocumentStoreClient {
    /// Create a new DocumentStoreClient with default configuration.
    pub fn new(provider: Box<dyn DocumentStoreProvider>) -> Self {
        Self::with_config(provider, DocumentStoreConfig::default())
    }

    /// Create a new DocumentStoreClient with custom configuration.
    pub fn with_config(provider: Box<dyn DocumentStoreProvider>, config: DocumentStoreConfig) -> Self {
        Self {
            provider: Arc::from(provider),
            config,
        }
    }

    /// Create a client backed by OpenSearch (or Elasticsearch).
    ///
    /// Fails with `ConnectionError` if the configuration is structurally
    /// invalid. Reachability is not checked; call `ping` for that.
    pub fn connect(config: ConnectionConfig) -> Result<Self, DocumentStoreError> {
        let provider = OpenSearchProvider::connect(&config)?;
        Ok(Self::new(Box::new(provider)))
    }

    /// The behavioral limits this client enforces.
    pub fn config(&self) -> &DocumentStoreConfig {
        &self.config
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), DocumentStoreError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(DocumentStoreError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    fn validate_collection(collection: &str) -> Result<(), DocumentStoreError> {
        if collection.is_empty() {
            return Err(DocumentStoreError::validation("collection name is required"));
        }
        Ok(())
    }

    fn validate_id(id: &str) -> Result<(), DocumentStoreError> {
        if id.is_empty() {
            return Err(DocumentStoreError::validation("record id is required"));
        }
        Ok(())
    }

    /// Convert a record into the provider's raw form.
    fn to_raw<R: Record>(record: &R) -> Result<RawDocument, DocumentStoreError> {
        let id = record.record_id();
        Self::validate_id(id)?;
        let source = serde_json::to_value(record)?;
        Ok(RawDocument::new(id, source))
    }

    /// Convert a stored document back into a record.
    fn from_raw<R: Record>(document: RawDocument) -> Result<R, DocumentStoreError> {
        serde_json::from_value(document.source).map_err(|e| {
            DocumentStoreError::serialization(format!(
                "stored document '{}' does not match the record type: {}",
                document.id, e
            ))
        })
    }

    /// Check the backend is alive.
    /// Output: backend metadata, or `BackendUnavailable`
    pub async fn ping(&self, ctx: &RequestContext) -> Result<BackendInfo, DocumentStoreError> {
        ctx.run(self.provider.ping()).await
    }

    /// Check whether a collection exists.
    pub async fn collection_exists(
        &self,
        ctx: &RequestContext,
        collection: &str,
    ) -> Result<bool, DocumentStoreError> {
        Self::validate_collection(collection)?;
        ctx.run(self.provider.collection_exists(collection)).await
    }

    /// Create a collection with the given schema.
    /// Output: `CollectionExists` if the name is taken
    ///
    /// The existence probe is only a shortcut. Two callers can race past it,
    /// so the loser gets `CollectionExists` from the create call itself.
    pub async fn create_collection(
        &self,
        ctx: &RequestContext,
        collection: &str,
        schema: &CollectionSchema,
    ) -> Result<(), DocumentStoreError> {
        Self::validate_collection(collection)?;
        if schema.fields.is_empty() {
            return Err(DocumentStoreError::validation("schema must map at least one field"));
        }

        if ctx.run(self.provider.collection_exists(collection)).await? {
            return Err(DocumentStoreError::collection_exists(collection));
        }

        ctx.run(self.provider.create_collection(collection, schema))
            .await
    }

    /// Delete a collection and every record in it. This cannot be undone.
    /// Output: `CollectionNotFound` if it does not exist
    pub async fn delete_collection(
        &self,
        ctx: &RequestContext,
        collection: &str,
    ) -> Result<(), DocumentStoreError> {
        Self::validate_collection(collection)?;
        warn!(collection = %collection, "Deleting collection and all of its records");
        ctx.run(self.provider.delete_collection(collection)).await
    }

    /// Insert a record, or fully replace the stored record with the same id.
    ///
    /// Fields of the old version that are absent from `record` are dropped.
    pub async fn upsert_record<R: Record>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        record: &R,
    ) -> Result<(), DocumentStoreError> {
        Self::validate_collection(collection)?;
        let document = Self::to_raw(record)?;
        ctx.run(self.provider.put_document(collection, &document))
            .await
    }

    /// Fully replace a record the caller believes exists.
    ///
    /// The backend contract is the same full overwrite as `upsert_record`: if
    /// the record is absent it is created. Callers that need "must exist"
    /// semantics check with `get_record` first.
    pub async fn replace_record<R: Record>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        record: &R,
    ) -> Result<(), DocumentStoreError> {
        self.upsert_record(ctx, collection, record).await
    }

    /// Upsert many records in one round trip.
    /// Output: one result per input record, in input order
    ///
    /// The batch is not transactional. Records that fail validation are
    /// reported as failed without being sent; every other record succeeds or
    /// fails on its own as reported by the backend.
    ///
    /// The batch size is limited by the configured max_batch_size (default: 1000).
    pub async fn upsert_records_batch<R: Record>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        records: &[R],
    ) -> Result<BatchOperationSummary, DocumentStoreError> {
        Self::validate_collection(collection)?;
        if records.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        self.validate_batch_size(records.len())?;

        let mut results = Vec::with_capacity(records.len());
        let mut positions = Vec::new();
        let mut documents = Vec::new();

        for (position, record) in records.iter().enumerate() {
            match Self::to_raw(record) {
                Ok(document) => {
                    positions.push(position);
                    documents.push(document);
                }
                Err(e) => results.push(BatchOperationResult {
                    id: record.record_id().to_string(),
                    position,
                    success: false,
                    error: Some(e),
                }),
            }
        }

        if !documents.is_empty() {
            let outcomes = ctx
                .run(self.provider.bulk_put_documents(collection, &documents))
                .await?;

            if outcomes.len() != documents.len() {
                return Err(DocumentStoreError::backend(
                    200,
                    format!(
                        "provider reported {} outcomes for {} records",
                        outcomes.len(),
                        documents.len()
                    ),
                ));
            }

            for (position, outcome) in positions.into_iter().zip(outcomes) {
                results.push(BatchOperationResult {
                    id: outcome.id,
                    position,
                    success: outcome.error.is_none(),
                    error: outcome.error,
                });
            }
        }

        let summary = BatchOperationSummary::from_results(results);
        info!(
            collection = %collection,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch upsert completed"
        );
        Ok(summary)
    }

    /// Fetch a record by id.
    /// Output: `Ok(None)` when no record has that id
    pub async fn get_record<R: Record>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
    ) -> Result<Option<R>, DocumentStoreError> {
        Self::validate_collection(collection)?;
        Self::validate_id(id)?;

        ctx.run(self.provider.get_document(collection, id))
            .await?
            .map(Self::from_raw)
            .transpose()
    }

    /// Full-text search `field` for `query`.
    /// Output: matching records in backend relevance order; empty when nothing matches
    ///
    /// The query is analysed the same way the field was at write time, so
    /// it matches on tokens, not substrings.
    pub async fn search_by_text<R: Record>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        field: &str,
        query: &str,
    ) -> Result<Vec<R>, DocumentStoreError> {
        Self::validate_collection(collection)?;
        if field.is_empty() {
            return Err(DocumentStoreError::validation("search field is required"));
        }

        let documents = ctx
            .run(
                self.provider
                    .match_documents(collection, field, query, self.config.search_size),
            )
            .await?;

        debug!(collection = %collection, field = %field, hits = documents.len(), "Search returned");
        documents.into_iter().map(Self::from_raw).collect()
    }

    /// Lazily stream every record in a collection, `page_size` records per
    /// backend round trip.
    ///
    /// The stream ends after the backend reports no more results. A failed
    /// page fetch or a record that does not decode as `R` yields one error
    /// and ends the stream; records already yielded stay yielded. The scan
    /// cursor is released when the stream ends, and also when it is dropped
    /// before then. The stream cannot be resumed: calling `list_all` again
    /// starts a fresh scan.
    pub fn list_all<'a, R: Record + 'a>(
        &'a self,
        ctx: &'a RequestContext,
        collection: &'a str,
        page_size: usize,
    ) -> impl Stream<Item = Result<R, DocumentStoreError>> + Send + 'a {
        let keep_alive = self.config.scroll_keep_alive.as_str();

        stream::unfold(ScanState::Start, move |mut state| async move {
            loop {
                state = match state {
                    ScanState::Done => return None,
                    ScanState::Start => {
                        if let Err(e) = Self::validate_collection(collection) {
                            return Some((Err(e), ScanState::Done));
                        }
                        if page_size == 0 {
                            let e = DocumentStoreError::validation(
                                "page size must be greater than zero",
                            );
                            return Some((Err(e), ScanState::Done));
                        }
                        let page = ctx
                            .run(self.provider.open_scroll(collection, page_size, keep_alive))
                            .await;
                        match page {
                            Ok(page) => self.scan_page(None, page).await,
                            Err(e) => return Some((Err(e), ScanState::Done)),
                        }
                    }
                    ScanState::Reading {
                        cursor,
                        mut documents,
                        last,
                    } => {
                        if let Some(document) = documents.next() {
                            let item = Self::from_raw::<R>(document);
                            if item.is_err() {
                                if let Some(cursor) = cursor {
                                    cursor.release().await;
                                }
                                return Some((item, ScanState::Done));
                            }
                            let state = ScanState::Reading {
                                cursor,
                                documents,
                                last,
                            };
                            return Some((item, state));
                        }

                        let cursor = match cursor {
                            Some(cursor) if !last => cursor,
                            cursor => {
                                if let Some(cursor) = cursor {
                                    cursor.release().await;
                                }
                                debug!(collection = %collection, "Scan exhausted");
                                return None;
                            }
                        };
                        let page = ctx
                            .run(self.provider.next_scroll(cursor.id(), keep_alive))
                            .await;
                        match page {
                            Ok(page) => self.scan_page(Some(cursor), page).await,
                            Err(e) => {
                                cursor.release().await;
                                return Some((Err(e), ScanState::Done));
                            }
                        }
                    }
                };
            }
        })
    }

    /// Move a scan onto a freshly fetched page.
    async fn scan_page(&self, cursor: Option<ScanCursor>, page: ScrollPage) -> ScanState {
        let last = page.cursor.is_none();
        let cursor = match (cursor, page.cursor) {
            (Some(mut cursor), Some(id)) => {
                cursor.id = id;
                Some(cursor)
            }
            (None, Some(id)) => Some(ScanCursor::new(self.provider.clone(), id)),
            (cursor, None) => cursor,
        };

        if page.documents.is_empty() {
            if let Some(cursor) = cursor {
                cursor.release().await;
            }
            return ScanState::Done;
        }

        ScanState::Reading {
            cursor,
            documents: page.documents.into_iter(),
            last,
        }
    }

    /// Merge `changes` into an existing record, leaving other fields untouched.
    /// Output: `RecordNotFound` if no record has that id
    ///
    /// Unlike `upsert_record`, this never creates a record.
    pub async fn patch_record(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
        changes: &FieldChanges,
    ) -> Result<(), DocumentStoreError> {
        Self::validate_collection(collection)?;
        Self::validate_id(id)?;
        if changes.is_empty() {
            return Err(DocumentStoreError::validation("no fields to update"));
        }

        ctx.run(self.provider.patch_document(collection, id, changes))
            .await
    }

    /// Delete a record by id.
    /// Output: `RecordNotFound` if no record has that id, on every attempt
    pub async fn delete_record(
        &self,
        ctx: &RequestContext,
        collection: &str,
        id: &str,
    ) -> Result<(), DocumentStoreError> {
        Self::validate_collection(collection)?;
        Self::validate_id(id)?;

        ctx.run(self.provider.delete_document(collection, id)).await
    }
}
