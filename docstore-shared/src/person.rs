//! The person record used as the sample schema.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A person stored by id with a full-text searchable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier, e.g. an employee number.
    pub id: String,
    /// Display name, tokenized for full-text matching.
    pub name: String,
}

impl Person {
    /// Create a new person record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Record for Person {
    fn record_id(&self) -> &str {
        &self.id
    }
}
