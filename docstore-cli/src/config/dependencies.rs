//! Dependency initialization and wiring for the document store CLI.

use std::time::Duration;
use tracing::info;

use crate::CliError;
use docstore_repository::{ConnectionConfig, DocumentStoreClient};

/// Default backend address.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

/// Default collection holding person records.
pub const DEFAULT_COLLECTION: &str = "person";

/// Connection settings gathered from flags and the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backend addresses in preference order.
    pub addresses: Vec<String>,
    /// Basic-auth username.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Collection to operate on.
    pub collection: String,
    /// Per-call deadline in seconds.
    pub timeout_secs: Option<u64>,
    /// Transport timeout for each HTTP request, in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Build the client's connection configuration.
    ///
    /// A username without a password (or the reverse) is a configuration error.
    pub fn connection_config(&self) -> Result<ConnectionConfig, CliError> {
        let addresses: Vec<String> = self
            .addresses
            .iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect();
        if addresses.is_empty() {
            return Err(CliError::config("at least one backend address is required"));
        }

        let mut config = ConnectionConfig::new(addresses);
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                config = config.with_credentials(username.clone(), password.clone());
            }
            (None, None) => {}
            _ => {
                return Err(CliError::config(
                    "username and password must be given together",
                ))
            }
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// The per-call deadline, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The document store client.
    pub client: DocumentStoreClient,
    /// The collection commands operate on.
    pub collection: String,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// The backend is not contacted here; commands that need it fail on their
    /// first call, and `ping` checks it explicitly.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(CliError)` - If initialization fails
    pub fn new(settings: &Settings) -> Result<Self, CliError> {
        let config = settings.connection_config()?;

        info!(
            addresses = ?config.addresses,
            collection = %settings.collection,
            authenticated = config.credentials.is_some(),
            "Initializing dependencies"
        );

        let client = DocumentStoreClient::connect(config)?;

        Ok(Self {
            client,
            collection: settings.collection.clone(),
        })
    }
}
