//! Request and response types for document store operations.

use serde_json::Value;

use crate::errors::DocumentStoreError;

/// A record as it travels between the client and a provider: its storage key
/// and its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    /// The storage key.
    pub id: String,
    /// The stored body (`_source`).
    pub source: Value,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }
}

/// Metadata reported by a backend liveness check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendInfo {
    /// Backend version number, e.g. `8.11.0`.
    pub version: String,
    /// Distribution name when the backend reports one (`opensearch`).
    pub distribution: Option<String>,
    /// Cluster name.
    pub cluster_name: Option<String>,
    /// Name of the node that answered.
    pub node_name: Option<String>,
}

/// One page of a `list_all` scan.
#[derive(Debug, Clone, Default)]
pub struct ScrollPage {
    /// Records on this page; empty once the scan is exhausted.
    pub documents: Vec<RawDocument>,
    /// Cursor for the next page, if the backend handed one out.
    pub cursor: Option<String>,
}

/// Outcome of a single record within a batch write as reported by the provider.
#[derive(Debug, Clone)]
pub struct BulkItemOutcome {
    /// The record's id.
    pub id: String,
    /// Error if the backend rejected the record.
    pub error: Option<DocumentStoreError>,
}

/// Result of a batch operation for a single record.
///
/// This struct represents the outcome of writing one record within a batch.
/// It indicates whether the write succeeded and includes error details if it
/// failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The record's id as supplied by the caller.
    pub id: String,
    /// Index of the record in the caller's input.
    pub position: usize,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<DocumentStoreError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// The batch is not transactional: each record succeeds or fails on its own,
/// and `results` holds one entry per input record in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of records in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each record.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-record results, counting outcomes.
    pub fn from_results(mut results: Vec<BatchOperationResult>) -> Self {
        results.sort_by_key(|result| result.position);
        let succeeded = results.iter().filter(|result| result.success).count();

        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Results for records that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|result| !result.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
