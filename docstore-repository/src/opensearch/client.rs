//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `DocumentStoreProvider`
//! using the OpenSearch Rust client. The same REST contract is served by
//! Elasticsearch, so either backend can sit behind it.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials as TransportCredentials,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    params::Refresh,
    BulkParts, ClearScrollParts, DeleteParts, GetParts, IndexParts, OpenSearch, ScrollParts,
    SearchParts, UpdateParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::DocumentStoreError;
use crate::interfaces::DocumentStoreProvider;
use crate::opensearch::index_config::index_body;
use crate::opensearch::queries::{
    build_bulk_index_lines, build_match_query, build_partial_update, build_scan_query,
    build_scroll_clear, build_scroll_continue,
};
use crate::opensearch::responses::{
    parse_backend_info, parse_bulk_items, parse_error_body, parse_get, parse_hits,
    parse_scroll_page, ErrorBody, INDEX_NOT_FOUND, RESOURCE_ALREADY_EXISTS,
};
use crate::schema::CollectionSchema;
use crate::types::{BackendInfo, BulkItemOutcome, RawDocument, ScrollPage};
use docstore_shared::FieldChanges;

/// OpenSearch-backed document store provider.
///
/// # Example
///
/// ```ignore
/// use docstore_repository::{ConnectionConfig, OpenSearchProvider};
/// let config = ConnectionConfig::new(["http://localhost:9200"]);
/// let provider = OpenSearchProvider::connect(&config)?;
/// let info = provider.ping().await?;
/// println!("backend version {}", info.version);
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    address: Url,
}

impl OpenSearchProvider {
    /// Create a provider for the given connection configuration.
    ///
    /// Requests go to the first address; the transport uses a single-node
    /// connection pool. No request is made here, so an unreachable backend
    /// is only noticed on the first call or on `ping`.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(DocumentStoreError::ConnectionError)` - If the configuration is unusable
    pub fn connect(config: &ConnectionConfig) -> Result<Self, DocumentStoreError> {
        config.validate()?;

        let addresses = config
            .addresses
            .iter()
            .map(|address| {
                Url::parse(address).map_err(|e| {
                    DocumentStoreError::connection(format!("Invalid address '{}': {}", address, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let address = addresses[0].clone();

        if addresses.len() > 1 {
            warn!(
                primary = %address,
                ignored = addresses.len() - 1,
                "Only the first backend address is used"
            );
        }

        let conn_pool = SingleNodeConnectionPool::new(address.clone());
        let mut builder = TransportBuilder::new(conn_pool);
        if config.disable_proxy {
            builder = builder.disable_proxy();
        }
        if let Some(credentials) = &config.credentials {
            builder = builder.auth(TransportCredentials::Basic(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| DocumentStoreError::connection(e.to_string()))?;

        info!(
            address = %address,
            authenticated = config.credentials.is_some(),
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            address,
        })
    }

    /// The address requests are sent to.
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Read a failed response's status and error body.
    async fn read_failure(response: Response) -> (u16, ErrorBody) {
        let status = response.status_code().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, parse_error_body(&body))
    }

    /// Read a successful response's JSON body.
    async fn read_json(response: Response) -> Result<Value, DocumentStoreError> {
        let status = response.status_code().as_u16();
        response.json::<Value>().await.map_err(|e| {
            DocumentStoreError::backend(status, format!("Malformed response body: {}", e))
        })
    }

    /// Map a failed record-level response, distinguishing a missing
    /// collection from a missing record.
    fn record_failure(
        collection: &str,
        id: &str,
        status: u16,
        body: ErrorBody,
    ) -> DocumentStoreError {
        match status {
            404 if body.is_type(INDEX_NOT_FOUND) => {
                DocumentStoreError::collection_not_found(collection)
            }
            404 => DocumentStoreError::record_not_found(collection, id),
            _ => DocumentStoreError::backend(status, body.reason),
        }
    }
}

/// Transport failures mean the backend never answered.
fn transport_error(err: opensearch::Error) -> DocumentStoreError {
    DocumentStoreError::unavailable(err.to_string())
}

#[async_trait]
impl DocumentStoreProvider for OpenSearchProvider {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<BackendInfo, DocumentStoreError> {
        let response = self.client.info().send().await.map_err(transport_error)?;

        let status = response.status_code();
        if !status.is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Ping failed");
            return Err(DocumentStoreError::unavailable(format!(
                "Ping failed with status {}: {}",
                status, body.reason
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DocumentStoreError::unavailable(e.to_string()))?;
        let info = parse_backend_info(&body)?;

        debug!(version = %info.version, "Backend is alive");
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn collection_exists(&self, collection: &str) -> Result<bool, DocumentStoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[collection]))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                error!(status = status, "Existence check failed");
                Err(DocumentStoreError::backend(
                    status,
                    format!("Unexpected status checking collection '{}'", collection),
                ))
            }
        }
    }

    #[instrument(skip(self, schema))]
    async fn create_collection(
        &self,
        collection: &str,
        schema: &CollectionSchema,
    ) -> Result<(), DocumentStoreError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(collection))
            .body(index_body(schema))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            // the create call is authoritative: a concurrent creator may have
            // won the race after our existence check
            if body.is_type(RESOURCE_ALREADY_EXISTS) {
                return Err(DocumentStoreError::collection_exists(collection));
            }
            error!(status = status, reason = %body.reason, "Create collection failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        info!(collection = %collection, "Collection created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, collection: &str) -> Result<(), DocumentStoreError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[collection]))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            if status == 404 {
                return Err(DocumentStoreError::collection_not_found(collection));
            }
            error!(status = status, reason = %body.reason, "Delete collection failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        info!(collection = %collection, "Collection deleted");
        Ok(())
    }

    #[instrument(skip(self, document), fields(id = %document.id))]
    async fn put_document(
        &self,
        collection: &str,
        document: &RawDocument,
    ) -> Result<(), DocumentStoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(collection, &document.id))
            .refresh(Refresh::True)
            .body(&document.source)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Index request failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        debug!(collection = %collection, id = %document.id, "Document written");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_put_documents(
        &self,
        collection: &str,
        documents: &[RawDocument],
    ) -> Result<Vec<BulkItemOutcome>, DocumentStoreError> {
        let body: Vec<JsonBody<Value>> = build_bulk_index_lines(collection, documents)
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::None)
            .refresh(Refresh::True)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Bulk request failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        let body = Self::read_json(response).await?;
        let outcomes = parse_bulk_items(&body, documents)?;

        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        if failed > 0 {
            warn!(
                collection = %collection,
                failed = failed,
                total = outcomes.len(),
                "Bulk request had per-item failures"
            );
        } else {
            debug!(collection = %collection, total = outcomes.len(), "Bulk request succeeded");
        }
        Ok(outcomes)
    }

    #[instrument(skip(self))]
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RawDocument>, DocumentStoreError> {
        let response = self
            .client
            .get(GetParts::IndexId(collection, id))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            debug!(collection = %collection, id = %id, "Document not found");
            return Ok(None);
        }
        if !status.is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Get request failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        let body = Self::read_json(response).await?;
        parse_get(&body)
    }

    #[instrument(skip(self))]
    async fn match_documents(
        &self,
        collection: &str,
        field: &str,
        text: &str,
        size: usize,
    ) -> Result<Vec<RawDocument>, DocumentStoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[collection]))
            .body(build_match_query(field, text, size))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Search request failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        let body = Self::read_json(response).await?;
        let documents = parse_hits(&body)?;

        debug!(collection = %collection, hits = documents.len(), "Search completed");
        Ok(documents)
    }

    #[instrument(skip(self))]
    async fn open_scroll(
        &self,
        collection: &str,
        page_size: usize,
        keep_alive: &str,
    ) -> Result<ScrollPage, DocumentStoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[collection]))
            .scroll(keep_alive)
            .body(build_scan_query(page_size))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Scroll open failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        let body = Self::read_json(response).await?;
        parse_scroll_page(&body)
    }

    #[instrument(skip(self, cursor))]
    async fn next_scroll(
        &self,
        cursor: &str,
        keep_alive: &str,
    ) -> Result<ScrollPage, DocumentStoreError> {
        let response = self
            .client
            .scroll(ScrollParts::None)
            .body(build_scroll_continue(cursor, keep_alive))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Scroll request failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }

        let body = Self::read_json(response).await?;
        parse_scroll_page(&body)
    }

    #[instrument(skip(self, cursor))]
    async fn close_scroll(&self, cursor: &str) -> Result<(), DocumentStoreError> {
        let response = self
            .client
            .clear_scroll(ClearScrollParts::None)
            .body(build_scroll_clear(cursor))
            .send()
            .await
            .map_err(transport_error)?;

        // an expired cursor is already gone
        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let (status, body) = Self::read_failure(response).await;
            error!(status = status, reason = %body.reason, "Scroll clear failed");
            return Err(DocumentStoreError::backend(status, body.reason));
        }
        Ok(())
    }

    #[instrument(skip(self, changes), fields(fields = changes.len()))]
    async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        changes: &FieldChanges,
    ) -> Result<(), DocumentStoreError> {
        let changes = serde_json::to_value(changes)?;
        let response = self
            .client
            .update(UpdateParts::IndexId(collection, id))
            .refresh(Refresh::True)
            .body(build_partial_update(&changes))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            if status != 404 {
                error!(status = status, reason = %body.reason, "Update request failed");
            }
            return Err(Self::record_failure(collection, id, status, body));
        }

        debug!(collection = %collection, id = %id, "Document patched");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(collection, id))
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            let (status, body) = Self::read_failure(response).await;
            if status != 404 {
                error!(status = status, reason = %body.reason, "Delete request failed");
            }
            return Err(Self::record_failure(collection, id, status, body));
        }

        debug!(collection = %collection, id = %id, "Document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_empty_addresses() {
        let config = ConnectionConfig::new(Vec::<String>::new());

        let result = OpenSearchProvider::connect(&config);

        assert!(matches!(result, Err(DocumentStoreError::ConnectionError(_))));
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = ConnectionConfig::new(["not a url"]);

        let result = OpenSearchProvider::connect(&config);

        assert!(matches!(result, Err(DocumentStoreError::ConnectionError(_))));
    }

    #[test]
    fn test_connect_uses_first_address() {
        let config = ConnectionConfig::new(["http://es-1:9200", "http://es-2:9200"])
            .with_credentials("elastic", "changeme");

        let provider = OpenSearchProvider::connect(&config).unwrap();

        assert_eq!(provider.address().as_str(), "http://es-1:9200/");
    }

    #[test]
    fn test_record_failure_mapping() {
        let missing_index = parse_error_body(
            r#"{"error":{"type":"index_not_found_exception","reason":"no such index [person]"},"status":404}"#,
        );
        let missing_doc = parse_error_body(
            r#"{"error":{"type":"document_missing_exception","reason":"[p1]: document missing"},"status":404}"#,
        );
        let conflict = parse_error_body(
            r#"{"error":{"type":"version_conflict_engine_exception","reason":"conflict"},"status":409}"#,
        );

        assert!(matches!(
            OpenSearchProvider::record_failure("person", "p1", 404, missing_index),
            DocumentStoreError::CollectionNotFound(_)
        ));
        assert!(OpenSearchProvider::record_failure("person", "p1", 404, missing_doc)
            .is_record_not_found());
        assert!(matches!(
            OpenSearchProvider::record_failure("person", "p1", 409, conflict),
            DocumentStoreError::BackendError { status: 409, .. }
        ));
    }
}
