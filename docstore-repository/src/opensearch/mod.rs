//! OpenSearch implementation of the document store provider.
//!
//! This module provides a concrete implementation of `DocumentStoreProvider`
//! for OpenSearch and the Elasticsearch-compatible REST contract.

mod client;
mod index_config;
mod queries;
mod responses;

pub use client::OpenSearchProvider;
pub use index_config::index_body;
