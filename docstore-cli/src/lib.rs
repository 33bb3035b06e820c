//! # Document Store CLI
//!
//! Command-line front end for the document store client: one subcommand per
//! collection or record operation, plus an end-to-end demo.

pub mod cli;
pub mod commands;
pub mod config;

pub use config::{Dependencies, Settings};

use docstore_repository::DocumentStoreError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation was refused without explicit confirmation.
    #[error("Refusing to {0} without --yes")]
    NotConfirmed(String),

    /// Some records of a batch were not stored.
    #[error("{failed} of {total} records failed")]
    BatchFailed { failed: usize, total: usize },

    /// Document store error.
    #[error(transparent)]
    StoreError(#[from] DocumentStoreError),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// A stable short name for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "config",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotConfirmed(_) => "not_confirmed",
            Self::BatchFailed { .. } => "batch_failed",
            Self::StoreError(e) => e.kind(),
        }
    }
}
