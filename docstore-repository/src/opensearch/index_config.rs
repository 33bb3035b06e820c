//! OpenSearch index settings and mappings.
//!
//! This module renders a `CollectionSchema` into the body of a create-index request.

use serde_json::{json, Map, Value};

use crate::schema::{CollectionSchema, FieldKind, FieldMapping};

/// Get the index settings and mappings for a collection schema.
///
/// - **Keyword fields**: exact-match lookups and filters
/// - **Text fields**: tokenized with the field's analyzer, optionally with a
///   `keyword` sub-field holding the raw value
pub fn index_body(schema: &CollectionSchema) -> Value {
    let properties: Map<String, Value> = schema
        .fields
        .iter()
        .map(|field| (field.name.clone(), field_mapping(field)))
        .collect();

    json!({
        "settings": {
            "number_of_shards": schema.number_of_shards,
            "number_of_replicas": schema.number_of_replicas
        },
        "mappings": {
            "properties": properties
        }
    })
}

fn field_mapping(field: &FieldMapping) -> Value {
    match &field.kind {
        FieldKind::Keyword => json!({ "type": "keyword" }),
        FieldKind::Text {
            analyzer,
            keyword_subfield,
        } => {
            let mut mapping = json!({ "type": "text" });
            if let Some(analyzer) = analyzer {
                mapping["analyzer"] = json!(analyzer);
            }
            if *keyword_subfield {
                mapping["fields"] = json!({
                    "keyword": { "type": "keyword" }
                });
            }
            mapping
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_index_body_structure() {
        let body = index_body(&CollectionSchema::person());

        // Check settings exist
        assert_eq!(body["settings"]["number_of_shards"], 1);
        assert_eq!(body["settings"]["number_of_replicas"], 0);

        // Check mappings exist
        let properties = &body["mappings"]["properties"];
        assert_eq!(properties["id"]["type"], "keyword");
        assert_eq!(properties["name"]["type"], "text");
        assert_eq!(properties["name"]["fields"]["keyword"]["type"], "keyword");
        assert!(properties["name"].get("analyzer").is_none());
    }

    #[test]
    fn test_analyzer_rendered() {
        let body = index_body(&CollectionSchema::person_with_analyzer("ik_max_word"));

        assert_eq!(
            body["mappings"]["properties"]["name"]["analyzer"],
            "ik_max_word"
        );
    }

    #[test]
    fn test_plain_text_field_has_no_subfields() {
        let schema = CollectionSchema::new()
            .field(FieldMapping::text("bio"))
            .shards(3)
            .replicas(1);
        let body = index_body(&schema);

        assert_eq!(body["settings"]["number_of_shards"], 3);
        assert_eq!(body["settings"]["number_of_replicas"], 1);
        assert!(body["mappings"]["properties"]["bio"].get("fields").is_none());
    }
}
