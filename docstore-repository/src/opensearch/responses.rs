//! Parsers for OpenSearch response bodies.

use serde_json::Value;

use crate::errors::DocumentStoreError;
use crate::types::{BackendInfo, BulkItemOutcome, RawDocument, ScrollPage};

/// Error type reported when a create hits an existing index.
pub const RESOURCE_ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Error type reported when the target index is missing.
pub const INDEX_NOT_FOUND: &str = "index_not_found_exception";

/// The `error` object of a failed response.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
    /// `error.type`, when the backend reported a structured error.
    pub error_type: Option<String>,
    /// `error.reason`, or the raw body when it was not structured.
    pub reason: String,
}

impl ErrorBody {
    pub fn is_type(&self, error_type: &str) -> bool {
        self.error_type.as_deref() == Some(error_type)
    }
}

/// Parse the body of a failed response.
///
/// Accepts `{"error": {"type", "reason"}}`, `{"error": "text"}`, and
/// non-JSON bodies.
pub fn parse_error_body(body: &str) -> ErrorBody {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    match parsed.as_ref().and_then(|value| value.get("error")) {
        Some(Value::Object(error)) => ErrorBody {
            error_type: error
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
            reason: error
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or(body)
                .to_string(),
        },
        Some(Value::String(reason)) => ErrorBody {
            error_type: None,
            reason: reason.clone(),
        },
        _ => ErrorBody {
            error_type: None,
            reason: body.to_string(),
        },
    }
}

/// Parse the root endpoint's answer.
pub fn parse_backend_info(body: &Value) -> Result<BackendInfo, DocumentStoreError> {
    let version = body
        .get("version")
        .ok_or_else(|| DocumentStoreError::unavailable("response has no version information"))?;
    let number = version
        .get("number")
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentStoreError::unavailable("response has no version number"))?;

    Ok(BackendInfo {
        version: number.to_string(),
        distribution: version
            .get("distribution")
            .and_then(Value::as_str)
            .map(str::to_string),
        cluster_name: body
            .get("cluster_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        node_name: body.get("name").and_then(Value::as_str).map(str::to_string),
    })
}

/// Parse a single search hit into a raw document.
///
/// Returns None if the hit has no `_id` or no `_source`.
pub fn parse_hit(hit: &Value) -> Option<RawDocument> {
    let id = hit.get("_id")?.as_str()?;
    let source = hit.get("_source")?;
    Some(RawDocument::new(id, source.clone()))
}

/// Parse `hits.hits[]` of a search or scroll response.
pub fn parse_hits(body: &Value) -> Result<Vec<RawDocument>, DocumentStoreError> {
    let hits = body
        .get("hits")
        .and_then(|hits| hits.get("hits"))
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentStoreError::backend(200, "search response has no hits array"))?;

    hits.iter()
        .map(|hit| {
            parse_hit(hit)
                .ok_or_else(|| DocumentStoreError::backend(200, "search hit has no _id or _source"))
        })
        .collect()
}

/// Parse a search or scroll response into a page with its continuation cursor.
pub fn parse_scroll_page(body: &Value) -> Result<ScrollPage, DocumentStoreError> {
    Ok(ScrollPage {
        documents: parse_hits(body)?,
        cursor: body
            .get("_scroll_id")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Parse a get-document response; None when `found` is false.
pub fn parse_get(body: &Value) -> Result<Option<RawDocument>, DocumentStoreError> {
    if !body.get("found").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(None);
    }
    parse_hit(body)
        .map(Some)
        .ok_or_else(|| DocumentStoreError::backend(200, "found document has no _id or _source"))
}

/// Parse the per-item results of a bulk response.
///
/// Items are reported in request order. Each item is an object keyed by its
/// action (`index`) holding a `status` and, on failure, an `error`.
pub fn parse_bulk_items(
    body: &Value,
    expected: &[RawDocument],
) -> Result<Vec<BulkItemOutcome>, DocumentStoreError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentStoreError::backend(200, "bulk response has no items array"))?;

    if items.len() != expected.len() {
        return Err(DocumentStoreError::backend(
            200,
            format!(
                "bulk response has {} items for {} documents",
                items.len(),
                expected.len()
            ),
        ));
    }

    Ok(items
        .iter()
        .zip(expected)
        .map(|(item, document)| {
            let result = item
                .as_object()
                .and_then(|actions| actions.values().next())
                .unwrap_or(&Value::Null);
            let status = result
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|status| u16::try_from(status).ok())
                .unwrap_or(0);

            let error = match result.get("error") {
                Some(error) => {
                    let reason = error
                        .get("reason")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string());
                    Some(DocumentStoreError::backend(status, reason))
                }
                None if (200..300).contains(&status) => None,
                None => Some(DocumentStoreError::backend(
                    status,
                    "bulk item failed without an error reason",
                )),
            };

            BulkItemOutcome {
                id: document.id.clone(),
                error,
            }
        })
        .collect())
}
