//! # Document Store Repository
//!
//! This crate provides a client for a text-searchable record store reached
//! over an Elasticsearch/OpenSearch-compatible REST contract. It includes
//! definitions for errors, configuration, the backend interface, and a
//! concrete implementation for OpenSearch.

pub mod client;
pub mod config;
pub mod context;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod schema;
pub mod types;

pub use client::DocumentStoreClient;
pub use config::{ConnectionConfig, Credentials, DocumentStoreConfig};
pub use context::RequestContext;
pub use errors::DocumentStoreError;
pub use interfaces::DocumentStoreProvider;
pub use crate::opensearch::OpenSearchProvider;
pub use schema::{CollectionSchema, FieldKind, FieldMapping};
pub use types::{BackendInfo, BatchOperationResult, BatchOperationSummary, RawDocument};

pub use docstore_shared::{FieldChanges, Person, Record};
