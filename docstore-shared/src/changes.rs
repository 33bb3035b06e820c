//! Partial update payloads.

use serde::Serialize;
use serde_json::{Map, Value};

/// A set of field name to new value pairs merged into an existing record.
///
/// Fields not present in the change set are left untouched by a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldChanges {
    fields: Map<String, Value>,
}

impl FieldChanges {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a new value, replacing any earlier change to the same field.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Check if any fields are set for update.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields in the change set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over the changed fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// The changes as a JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for FieldChanges {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
