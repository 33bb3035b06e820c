//! Configuration and dependency wiring for the CLI.

mod dependencies;

pub use dependencies::{Dependencies, Settings, DEFAULT_ADDRESS, DEFAULT_COLLECTION};
