//! Configuration types for the DocumentStoreClient.

use std::time::Duration;

use crate::errors::DocumentStoreError;

/// Default number of hits requested by a full-text search.
pub const DEFAULT_SEARCH_SIZE: usize = 10;

/// Default keep-alive for scroll cursors used by `list_all`.
pub const DEFAULT_SCROLL_KEEP_ALIVE: &str = "1m";

/// Username and password for HTTP basic authentication.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and how to reach the backend.
///
/// This value is owned by the caller and handed to the client at
/// construction; the client never reads configuration from the environment.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Backend endpoint URLs in preference order. At least one is required.
    pub addresses: Vec<String>,
    /// Optional basic-auth credentials.
    pub credentials: Option<Credentials>,
    /// Transport-level timeout applied to every request.
    pub request_timeout: Option<Duration>,
    /// Bypass any system HTTP proxy.
    pub disable_proxy: bool,
}

impl ConnectionConfig {
    /// Create a config for the given addresses with no credentials.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            credentials: None,
            request_timeout: None,
            disable_proxy: true,
        }
    }

    /// Authenticate with a username and password.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Apply a transport-level timeout to every request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Check the configuration is structurally usable.
    pub fn validate(&self) -> Result<(), DocumentStoreError> {
        if self.addresses.is_empty() {
            return Err(DocumentStoreError::connection(
                "at least one backend address is required",
            ));
        }
        if self.addresses.iter().any(|address| address.trim().is_empty()) {
            return Err(DocumentStoreError::connection(
                "backend addresses must not be empty",
            ));
        }
        Ok(())
    }
}

/// Behavioral limits for the DocumentStoreClient.
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Maximum number of records allowed in a single batch operation.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
    /// Number of hits requested by `search_by_text`.
    pub search_size: usize,
    /// How long the backend keeps a `list_all` cursor alive between pages.
    pub scroll_keep_alive: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            search_size: DEFAULT_SEARCH_SIZE,
            scroll_keep_alive: DEFAULT_SCROLL_KEEP_ALIVE.to_string(),
        }
    }
}

impl DocumentStoreConfig {
    /// Create a config with no batch size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }

    /// Request a different number of hits from full-text searches.
    pub fn search_size(mut self, search_size: usize) -> Self {
        self.search_size = search_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_addresses_rejected() {
        let config = ConnectionConfig::new(Vec::<String>::new());
        let err = config.validate().unwrap_err();

        assert!(matches!(err, DocumentStoreError::ConnectionError(_)));
    }

    #[test]
    fn test_blank_address_rejected() {
        let config = ConnectionConfig::new(["http://localhost:9200", "  "]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let config = ConnectionConfig::new(["http://localhost:9200"])
            .with_credentials("elastic", "hunter2");
        let rendered = format!("{:?}", config);

        assert!(rendered.contains("elastic"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_default_limits() {
        let config = DocumentStoreConfig::default();

        assert_eq!(config.max_batch_size, Some(1000));
        assert_eq!(config.search_size, DEFAULT_SEARCH_SIZE);
        assert_eq!(config.scroll_keep_alive, "1m");
        assert!(DocumentStoreConfig::unlimited().max_batch_size.is_none());
    }
}
