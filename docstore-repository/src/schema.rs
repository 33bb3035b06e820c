//! Collection schemas.
//!
//! A schema is fixed when a collection is created: it decides which fields are
//! exact-match keys and which are tokenized for full-text search.

/// How a single field is stored and analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Exact-match value, not tokenized (ids, codes).
    Keyword,
    /// Tokenized text for full-text matching.
    Text {
        /// Analyzer used at index and query time; the backend default when None.
        analyzer: Option<String>,
        /// Also index the raw value under a `keyword` sub-field for exact matching.
        keyword_subfield: bool,
    },
}

/// Mapping for one field of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldMapping {
    pub fn keyword(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Keyword,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text {
                analyzer: None,
                keyword_subfield: false,
            },
        }
    }

    /// Use a specific analyzer for a text field. Has no effect on keyword fields.
    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        if let FieldKind::Text {
            analyzer: ref mut current,
            ..
        } = self.kind
        {
            *current = Some(analyzer.into());
        }
        self
    }

    /// Add an exact-match `keyword` sub-field to a text field.
    pub fn with_keyword_subfield(mut self) -> Self {
        if let FieldKind::Text {
            ref mut keyword_subfield,
            ..
        } = self.kind
        {
            *keyword_subfield = true;
        }
        self
    }
}

/// Field mappings and topology settings for a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub fields: Vec<FieldMapping>,
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for CollectionSchema {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            number_of_shards: 1,
            number_of_replicas: 0,
        }
    }
}

impl CollectionSchema {
    /// An empty schema with one shard and no replicas.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldMapping) -> Self {
        self.fields.push(field);
        self
    }

    pub fn shards(mut self, number_of_shards: u32) -> Self {
        self.number_of_shards = number_of_shards;
        self
    }

    pub fn replicas(mut self, number_of_replicas: u32) -> Self {
        self.number_of_replicas = number_of_replicas;
        self
    }

    /// The person schema: `id` as an exact-match key and `name` as tokenized
    /// text with a `keyword` sub-field.
    pub fn person() -> Self {
        Self::new()
            .field(FieldMapping::keyword("id"))
            .field(FieldMapping::text("name").with_keyword_subfield())
    }

    /// The person schema with a language analyzer on `name`, e.g. `ik_max_word`
    /// for Chinese text. The analyzer plugin must be installed on the backend.
    pub fn person_with_analyzer(analyzer: impl Into<String>) -> Self {
        Self::new()
            .field(FieldMapping::keyword("id"))
            .field(
                FieldMapping::text("name")
                    .analyzer(analyzer)
                    .with_keyword_subfield(),
            )
    }

    /// Look up a field's mapping by name.
    pub fn get(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|field| field.name == name)
    }
}
